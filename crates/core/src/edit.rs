//! In-place editing primitives: edit mode, edit targets, and save debouncing.
//!
//! Edits are applied to the canonical [`SlideDocument`] held in memory, and
//! that document is what gets saved. Nothing is read back from rendered
//! markup.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::slide::SlideDocument;
use crate::types::Position;

/// Quiet period after the last edit before a debounced save fires.
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    #[default]
    Viewing,
    Editing,
}

impl EditMode {
    pub fn toggled(self) -> Self {
        match self {
            EditMode::Viewing => EditMode::Editing,
            EditMode::Editing => EditMode::Viewing,
        }
    }

    pub fn is_editing(self) -> bool {
        self == EditMode::Editing
    }
}

/// An editable text region of a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "camelCase")]
pub enum EditTarget {
    Title,
    Subtitle,
    Tagline,
    Presenter,
    Visual,
    SectionTitle { section: usize },
    SectionItem { section: usize, item: usize },
    SectionContent { section: usize },
}

/// Encoded as the `data-edit` attribute on rendered nodes, e.g. `title` or
/// `section-item:0:2`.
impl fmt::Display for EditTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditTarget::Title => f.write_str("title"),
            EditTarget::Subtitle => f.write_str("subtitle"),
            EditTarget::Tagline => f.write_str("tagline"),
            EditTarget::Presenter => f.write_str("presenter"),
            EditTarget::Visual => f.write_str("visual"),
            EditTarget::SectionTitle { section } => write!(f, "section-title:{section}"),
            EditTarget::SectionItem { section, item } => write!(f, "section-item:{section}:{item}"),
            EditTarget::SectionContent { section } => write!(f, "section-content:{section}"),
        }
    }
}

impl FromStr for EditTarget {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::Validation(format!("Unknown edit target: {s}"));
        let mut parts = s.split(':');
        let name = parts.next().unwrap_or_default();
        let mut index = || -> Result<usize, CoreError> {
            parts.next().and_then(|n| n.parse().ok()).ok_or_else(invalid)
        };

        let target = match name {
            "title" => EditTarget::Title,
            "subtitle" => EditTarget::Subtitle,
            "tagline" => EditTarget::Tagline,
            "presenter" => EditTarget::Presenter,
            "visual" => EditTarget::Visual,
            "section-title" => EditTarget::SectionTitle { section: index()? },
            "section-content" => EditTarget::SectionContent { section: index()? },
            "section-item" => {
                let section = index()?;
                EditTarget::SectionItem {
                    section,
                    item: index()?,
                }
            }
            _ => return Err(invalid()),
        };
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(target)
    }
}

/// Replace the text of `target` in `doc`.
///
/// Fails with `Validation` when the target does not exist on this kind of
/// slide or indexes past the end of a section list.
pub fn apply_edit(doc: &mut SlideDocument, target: EditTarget, text: String) -> Result<(), CoreError> {
    let kind = doc.kind();

    match (doc, target) {
        (SlideDocument::Title(t), EditTarget::Title) => t.title = text,
        (SlideDocument::Title(t), EditTarget::Subtitle) => t.subtitle = text,
        (SlideDocument::Title(t), EditTarget::Tagline) => t.tagline = text,
        (SlideDocument::Title(t), EditTarget::Presenter) => t.presenter = Some(text),
        (SlideDocument::Content(c), EditTarget::Title) => c.title = text,
        (SlideDocument::Content(c), EditTarget::Visual) => c.visual = Some(text),
        (SlideDocument::Content(c), EditTarget::SectionTitle { section }) => {
            c.sections
                .get_mut(section)
                .ok_or_else(|| out_of_range("section", section))?
                .title = text;
        }
        (SlideDocument::Content(c), EditTarget::SectionContent { section }) => {
            c.sections
                .get_mut(section)
                .ok_or_else(|| out_of_range("section", section))?
                .content = Some(text);
        }
        (SlideDocument::Content(c), EditTarget::SectionItem { section, item }) => {
            let slot = c
                .sections
                .get_mut(section)
                .ok_or_else(|| out_of_range("section", section))?
                .list
                .as_mut()
                .and_then(|items| items.get_mut(item))
                .ok_or_else(|| out_of_range("list item", item))?;
            *slot = text;
        }
        _ => {
            return Err(CoreError::Validation(format!(
                "{target:?} is not editable on a {kind} slide"
            )))
        }
    }
    Ok(())
}

fn out_of_range(what: &str, index: usize) -> CoreError {
    CoreError::Validation(format!("No {what} at index {index}"))
}

/// Per-slide trailing-edge debouncer.
///
/// Each slide position has at most one pending deadline. Touching a
/// position pushes its deadline out by the window; [`Debouncer::take_due`]
/// hands back the positions whose window has elapsed.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    pending: BTreeMap<Position, Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SAVE_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: BTreeMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record an edit at `now`, restarting the quiet period.
    pub fn touch(&mut self, position: Position, now: Instant) {
        self.pending.insert(position, now + self.window);
    }

    /// Drop the pending deadline. Returns whether one existed.
    pub fn cancel(&mut self, position: Position) -> bool {
        self.pending.remove(&position).is_some()
    }

    pub fn is_pending(&self, position: Position) -> bool {
        self.pending.contains_key(&position)
    }

    /// Make every pending position due at `now`.
    pub fn expedite_all(&mut self, now: Instant) {
        for deadline in self.pending.values_mut() {
            *deadline = (*deadline).min(now);
        }
    }

    /// Earliest pending deadline, for callers that sleep until it.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Remove and return the positions whose deadline is at or before `now`.
    pub fn take_due(&mut self, now: Instant) -> Vec<Position> {
        let due: Vec<Position> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(position, _)| *position)
            .collect();
        for position in &due {
            self.pending.remove(position);
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slide::{ContentSlide, Section, TitleSlide};

    fn content() -> SlideDocument {
        SlideDocument::Content(ContentSlide {
            title: "T".into(),
            visual: None,
            sections: vec![
                Section {
                    title: "S0".into(),
                    list: Some(vec!["a".into(), "b".into()]),
                    content: None,
                },
                Section {
                    title: "S1".into(),
                    list: None,
                    content: Some("para".into()),
                },
            ],
        })
    }

    #[test]
    fn edits_land_in_the_document() {
        let mut doc = content();
        apply_edit(&mut doc, EditTarget::Title, "New".into()).unwrap();
        apply_edit(&mut doc, EditTarget::SectionItem { section: 0, item: 1 }, "B".into()).unwrap();
        apply_edit(&mut doc, EditTarget::SectionContent { section: 1 }, "P".into()).unwrap();
        apply_edit(&mut doc, EditTarget::Visual, "Chart".into()).unwrap();

        let SlideDocument::Content(c) = doc else {
            panic!("expected content slide");
        };
        assert_eq!(c.title, "New");
        assert_eq!(c.sections[0].list.as_ref().unwrap()[1], "B");
        assert_eq!(c.sections[1].content.as_deref(), Some("P"));
        assert_eq!(c.visual.as_deref(), Some("Chart"));
    }

    #[test]
    fn wrong_target_for_kind_is_rejected() {
        let mut title = SlideDocument::Title(TitleSlide {
            title: "T".into(),
            subtitle: String::new(),
            tagline: String::new(),
            presenter: None,
        });
        assert!(apply_edit(&mut title, EditTarget::Visual, "x".into()).is_err());
        apply_edit(&mut title, EditTarget::Presenter, "Jo".into()).unwrap();

        let mut doc = content();
        assert!(apply_edit(&mut doc, EditTarget::Tagline, "x".into()).is_err());
        assert!(apply_edit(&mut doc, EditTarget::SectionTitle { section: 5 }, "x".into()).is_err());
        assert!(apply_edit(&mut doc, EditTarget::SectionItem { section: 1, item: 0 }, "x".into()).is_err());
        assert_eq!(doc, content());
    }

    #[test]
    fn rapid_touches_collapse_to_one_due_entry() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();

        for ms in [0, 200, 400, 600, 800] {
            debouncer.touch(3, start + Duration::from_millis(ms));
        }

        assert!(debouncer.take_due(start + Duration::from_millis(1500)).is_empty());
        assert_eq!(debouncer.take_due(start + Duration::from_millis(1800)), vec![3]);
        assert!(debouncer.take_due(start + Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn positions_debounce_independently() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.touch(1, start);
        debouncer.touch(2, start + Duration::from_millis(500));

        assert_eq!(debouncer.next_deadline(), Some(start + SAVE_DEBOUNCE));
        assert_eq!(debouncer.take_due(start + Duration::from_millis(1000)), vec![1]);
        assert!(debouncer.is_pending(2));
    }

    #[test]
    fn cancel_and_expedite() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.touch(1, start);
        debouncer.touch(2, start);

        assert!(debouncer.cancel(1));
        assert!(!debouncer.cancel(1));

        debouncer.expedite_all(start);
        assert_eq!(debouncer.take_due(start), vec![2]);
    }

    #[test]
    fn targets_parse_from_their_attribute_form() {
        let targets = [
            EditTarget::Title,
            EditTarget::Presenter,
            EditTarget::SectionTitle { section: 2 },
            EditTarget::SectionItem { section: 0, item: 3 },
            EditTarget::SectionContent { section: 1 },
        ];
        for target in targets {
            assert_eq!(target.to_string().parse::<EditTarget>().unwrap(), target);
        }
        assert_eq!(
            EditTarget::SectionItem { section: 0, item: 3 }.to_string(),
            "section-item:0:3"
        );

        for bad in ["", "heading", "section-item:1", "section-title:x", "title:1", "section-content:1:2"] {
            assert!(bad.parse::<EditTarget>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn edit_mode_toggles() {
        assert_eq!(EditMode::default(), EditMode::Viewing);
        assert!(EditMode::Viewing.toggled().is_editing());
        assert!(!EditMode::Editing.toggled().is_editing());
    }
}
