//! Slide Renderer.
//!
//! Maps a [`SlideView`] to HTML. Output depends only on the view and the
//! flags passed in, so rendering the same slide twice yields identical
//! markup. Every editable node carries `data-position` and a `data-edit`
//! target (see [`EditTarget`]); image controls carry `data-position`.

use askama::Template;
use pitchdeck_core::edit::EditTarget;
use pitchdeck_core::merge::SlideView;
use pitchdeck_core::slide::{Section, SectionBody, SlideDocument};
use pitchdeck_core::types::Position;

use crate::state::PresentationState;

/// Placeholder caption for content slides without image or visual text.
pub const VISUAL_PLACEHOLDER: &str = "Image placeholder";

/// Page background used for captures.
pub const CAPTURE_BACKGROUND: &str = "#0a0a0a";

/// Inline tags list items may carry. Attributes are always stripped.
pub const INLINE_TAGS: &[&str] = &["strong", "b", "em", "i", "u", "br", "span"];

#[derive(Debug, thiserror::Error)]
#[error("Template error: {0}")]
pub struct RenderError(#[from] askama::Error);

// ---------------------------------------------------------------------------
// Template structs
// ---------------------------------------------------------------------------

#[derive(Template)]
#[template(path = "visual.html")]
struct VisualTemplate<'a> {
    position: Position,
    editing: bool,
    has_image: bool,
    image_url: &'a str,
    visual_text: &'a str,
}

struct ItemView {
    target: String,
    html: String,
}

struct SectionView<'a> {
    is_list: bool,
    is_paragraph: bool,
    title: &'a str,
    title_target: String,
    items: Vec<ItemView>,
    content: &'a str,
    content_target: String,
}

#[derive(Template)]
#[template(path = "slide.html")]
struct SlideTemplate<'a> {
    position: Position,
    number: usize,
    active: bool,
    editing: bool,
    is_title: bool,
    title: &'a str,
    subtitle: &'a str,
    tagline: &'a str,
    has_presenter: bool,
    presenter: &'a str,
    visual_html: String,
    sections: Vec<SectionView<'a>>,
}

struct NavItem<'a> {
    position: Position,
    title: &'a str,
    fragment: String,
    active: bool,
}

#[derive(Template)]
#[template(path = "deck.html")]
struct DeckTemplate<'a> {
    deck_title: &'a str,
    editing: bool,
    active_index: usize,
    nav: Vec<NavItem<'a>>,
    slides: Vec<String>,
}

#[derive(Template)]
#[template(path = "capture.html")]
struct CaptureTemplate<'a> {
    background: &'a str,
    slide: &'a str,
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// The image area of a content slide: the image plus a delete control, or
/// the visual caption plus an upload control. Controls are hidden unless
/// `editing`.
pub fn render_visual(view: &SlideView, editing: bool) -> Result<String, RenderError> {
    let template = VisualTemplate {
        position: view.position,
        editing,
        has_image: view.image_url.is_some(),
        image_url: view.image_url.as_deref().unwrap_or_default(),
        visual_text: view
            .content
            .visual()
            .filter(|v| !v.is_empty())
            .unwrap_or(VISUAL_PLACEHOLDER),
    };
    Ok(template.render()?)
}

/// One slide's markup.
pub fn render_slide(view: &SlideView, editing: bool, active: bool) -> Result<String, RenderError> {
    let mut template = SlideTemplate {
        position: view.position,
        number: usize::try_from(view.position).unwrap_or_default() + 1,
        active,
        editing,
        is_title: view.content.is_title(),
        title: view.content.title(),
        subtitle: "",
        tagline: "",
        has_presenter: false,
        presenter: "",
        visual_html: String::new(),
        sections: Vec::new(),
    };

    match &view.content {
        SlideDocument::Title(t) => {
            template.subtitle = &t.subtitle;
            template.tagline = &t.tagline;
            if let Some(presenter) = t.presenter.as_deref().filter(|p| !p.is_empty()) {
                template.has_presenter = true;
                template.presenter = presenter;
            }
        }
        SlideDocument::Content(c) => {
            template.visual_html = render_visual(view, editing)?;
            template.sections = c
                .sections
                .iter()
                .enumerate()
                .map(|(index, section)| section_view(index, section))
                .collect();
        }
    }

    Ok(template.render()?)
}

fn section_view(index: usize, section: &Section) -> SectionView<'_> {
    let mut view = SectionView {
        is_list: false,
        is_paragraph: false,
        title: &section.title,
        title_target: EditTarget::SectionTitle { section: index }.to_string(),
        items: Vec::new(),
        content: "",
        content_target: EditTarget::SectionContent { section: index }.to_string(),
    };
    match section.body() {
        SectionBody::List(items) => {
            view.is_list = true;
            view.items = items
                .iter()
                .enumerate()
                .map(|(item, html)| ItemView {
                    target: EditTarget::SectionItem { section: index, item }.to_string(),
                    html: inline_markup(html),
                })
                .collect();
        }
        SectionBody::Paragraph(text) => {
            view.is_paragraph = true;
            view.content = text;
        }
        SectionBody::HeadingOnly => {}
    }
    view
}

/// Reduce a list item to the [`INLINE_TAGS`] allowlist. Anything else is
/// dropped (`script` and `style` with their content) and text is escaped.
pub fn inline_markup(fragment: &str) -> String {
    let mut builder = ammonia::Builder::empty();
    builder
        .add_tags(INLINE_TAGS)
        .add_clean_content_tags(["script", "style"]);
    builder.clean(fragment).to_string()
}

/// The whole deck page: navigation list plus every slide, with the
/// state's active slide marked.
pub fn render_deck(
    deck_title: &str,
    views: &[SlideView],
    state: &PresentationState,
) -> Result<String, RenderError> {
    let editing = state.editing();
    let slides = views
        .iter()
        .enumerate()
        .map(|(index, view)| render_slide(view, editing, state.is_active(index)))
        .collect::<Result<Vec<_>, _>>()?;

    let nav = views
        .iter()
        .enumerate()
        .map(|(index, view)| NavItem {
            position: view.position,
            title: &view.title,
            fragment: format!("{}{}", pitchdeck_core::navigation::FRAGMENT_PREFIX, index + 1),
            active: state.is_active(index),
        })
        .collect();

    let template = DeckTemplate {
        deck_title,
        editing,
        active_index: state.current_index(),
        nav,
        slides,
    };
    Ok(template.render()?)
}

/// A standalone page showing only `slide_html`, full viewport, for
/// rasterization.
pub fn render_capture(slide_html: &str) -> Result<String, RenderError> {
    let template = CaptureTemplate {
        background: CAPTURE_BACKGROUND,
        slide: slide_html,
    };
    Ok(template.render()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pitchdeck_core::slide::{ContentSlide, TitleSlide};

    fn view(position: Position, content: SlideDocument, image_url: Option<&str>) -> SlideView {
        let now = Utc.timestamp_opt(0, 0).unwrap();
        SlideView {
            id: 1,
            position,
            title: content.title().to_string(),
            content,
            image_url: image_url.map(str::to_string),
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn content_view(image_url: Option<&str>) -> SlideView {
        view(
            2,
            SlideDocument::Content(ContentSlide {
                title: "Market".into(),
                visual: Some("Growth chart".into()),
                sections: vec![
                    Section {
                        title: "Size".into(),
                        list: Some(vec!["<strong>$4B</strong> TAM".into(), "Growing".into()]),
                        content: None,
                    },
                    Section {
                        title: "Why now".into(),
                        list: None,
                        content: Some("Because <timing>".into()),
                    },
                    Section {
                        title: "Ask".into(),
                        list: None,
                        content: None,
                    },
                ],
            }),
            image_url,
        )
    }

    #[test]
    fn rendering_is_deterministic() {
        let v = content_view(None);
        assert_eq!(
            render_slide(&v, false, true).unwrap(),
            render_slide(&v, false, true).unwrap()
        );
    }

    #[test]
    fn title_slide_shows_presenter_only_when_set() {
        let mut doc = TitleSlide {
            title: "Deck".into(),
            subtitle: "Sub".into(),
            tagline: "Tag".into(),
            presenter: None,
        };
        let html = render_slide(&view(0, SlideDocument::Title(doc.clone()), None), false, true).unwrap();
        assert!(html.contains("title-slide"));
        assert!(html.contains("data-edit=\"tagline\""));
        assert!(!html.contains("data-edit=\"presenter\""));

        doc.presenter = Some("Jo".into());
        let html = render_slide(&view(0, SlideDocument::Title(doc), None), false, true).unwrap();
        assert!(html.contains("data-edit=\"presenter\">Jo</p>"));
    }

    #[test]
    fn content_slide_tags_every_editable_region() {
        let html = render_slide(&content_view(None), true, false).unwrap();

        assert!(html.contains("id=\"slide-3\""));
        assert!(html.contains("data-edit=\"section-title:0\""));
        assert!(html.contains("data-edit=\"section-item:0:1\""));
        assert!(html.contains("data-edit=\"section-content:1\""));
        assert!(html.contains("data-edit=\"section-title:2\""));
        assert!(!html.contains("section-content:2"));
        assert!(html.contains("contenteditable=\"true\""));
        assert!(!html.contains("contenteditable=\"false\""));
        assert!(html.contains("data-position=\"2\""));
    }

    #[test]
    fn list_items_keep_markup_but_text_is_escaped() {
        let html = render_slide(&content_view(None), false, false).unwrap();
        assert!(html.contains("<strong>$4B</strong> TAM"));
        assert!(!html.contains("<timing>"));
        assert!(html.contains("Because &#60;timing&#62;"));
    }

    #[test]
    fn list_items_drop_markup_outside_the_inline_allowlist() {
        assert_eq!(inline_markup("<em onclick=\"x()\">hi</em>"), "<em>hi</em>");
        assert_eq!(inline_markup("a<script>alert(1)</script>b"), "ab");

        let img = inline_markup("<img src=x onerror=alert(1)>Revenue");
        assert_eq!(img, "Revenue");

        let mut doc = content_view(None).content;
        if let SlideDocument::Content(content) = &mut doc {
            content.sections[0].list = Some(vec![
                "<a href=\"javascript:alert(1)\">click</a> <b>bold</b>".into(),
            ]);
        }
        let html = render_slide(&view(2, doc, None), false, false).unwrap();
        assert!(!html.contains("<a "));
        assert!(!html.contains("javascript:"));
        assert!(html.contains("click <b>bold</b>"));
    }

    #[test]
    fn image_controls_follow_image_state_and_mode() {
        let viewing = render_visual(&content_view(None), false).unwrap();
        assert!(viewing.contains("image-upload-btn"));
        assert!(viewing.contains("Growth chart"));
        assert!(viewing.contains(" hidden>+"));

        let editing = render_visual(&content_view(Some("/uploads/a.png")), true).unwrap();
        assert!(editing.contains("has-image"));
        assert!(editing.contains("src=\"/uploads/a.png\""));
        assert!(editing.contains("image-delete-btn"));
        assert!(!editing.contains("image-upload-btn"));
        assert!(!editing.contains(" hidden"));
    }

    #[test]
    fn missing_visual_uses_placeholder() {
        let mut v = content_view(None);
        if let SlideDocument::Content(c) = &mut v.content {
            c.visual = None;
        }
        assert!(render_visual(&v, false).unwrap().contains(VISUAL_PLACEHOLDER));
    }

    #[test]
    fn deck_marks_exactly_one_active_slide() {
        let views = vec![content_view(None), content_view(None), content_view(None)];
        let mut state = PresentationState::new(views.len());
        state.go_to(1);

        let html = render_deck("Pitch", &views, &state).unwrap();
        assert_eq!(html.matches("slide active").count(), 1);
        assert_eq!(html.matches("slide-nav-item active").count(), 1);
        assert!(html.contains("href=\"#slide-2\""));
        assert!(html.contains("<title>Pitch</title>"));
    }

    #[test]
    fn capture_page_wraps_the_slide() {
        let slide = render_slide(&content_view(None), false, true).unwrap();
        let page = render_capture(&slide).unwrap();
        assert!(page.contains(&slide));
        assert!(page.contains(CAPTURE_BACKGROUND));
    }
}
