//! Slide document model.
//!
//! A slide is either a title slide or a content slide. On the wire both are
//! JSON objects discriminated by `"type"`; a missing `type` reads as a
//! content slide because the shipped catalog and older stored records
//! omit it.

use serde::{Deserialize, Deserializer, Serialize};

/// Discriminant value for title slides.
pub const KIND_TITLE: &str = "title";

/// Discriminant value for content slides.
pub const KIND_CONTENT: &str = "content";

/// The opening slide of a deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleSlide {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presenter: Option<String>,
}

/// A regular slide: heading, optional visual caption, and sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSlide {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// A heading followed by either a bullet list or a paragraph.
///
/// List items are rich-text fragments and may carry inline markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// How a section renders. A non-empty list wins over a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionBody<'a> {
    List(&'a [String]),
    Paragraph(&'a str),
    HeadingOnly,
}

impl Section {
    pub fn body(&self) -> SectionBody<'_> {
        match (&self.list, &self.content) {
            (Some(items), _) if !items.is_empty() => SectionBody::List(items),
            (_, Some(text)) if !text.is_empty() => SectionBody::Paragraph(text),
            _ => SectionBody::HeadingOnly,
        }
    }
}

/// One slide of the deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SlideDocument {
    Title(TitleSlide),
    Content(ContentSlide),
}

/// Deserialization mirror of [`SlideDocument`]; the outer impl fills in a
/// missing discriminant before delegating here.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TaggedDocument {
    Title(TitleSlide),
    Content(ContentSlide),
}

impl<'de> Deserialize<'de> for SlideDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut value = serde_json::Value::deserialize(deserializer)?;
        if let Some(obj) = value.as_object_mut() {
            obj.entry("type")
                .or_insert_with(|| serde_json::Value::String(KIND_CONTENT.to_string()));
        }
        let tagged = TaggedDocument::deserialize(value).map_err(serde::de::Error::custom)?;
        Ok(match tagged {
            TaggedDocument::Title(t) => SlideDocument::Title(t),
            TaggedDocument::Content(c) => SlideDocument::Content(c),
        })
    }
}

impl SlideDocument {
    pub fn title(&self) -> &str {
        match self {
            SlideDocument::Title(t) => &t.title,
            SlideDocument::Content(c) => &c.title,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SlideDocument::Title(_) => KIND_TITLE,
            SlideDocument::Content(_) => KIND_CONTENT,
        }
    }

    pub fn is_title(&self) -> bool {
        matches!(self, SlideDocument::Title(_))
    }

    /// Visual caption shown when the slide has no image. Title slides have none.
    pub fn visual(&self) -> Option<&str> {
        match self {
            SlideDocument::Title(_) => None,
            SlideDocument::Content(c) => c.visual.as_deref(),
        }
    }

    /// Serialize to the opaque JSON form stored in the content column.
    pub fn to_value(&self) -> serde_json::Value {
        // Serializing plain strings and vectors cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
