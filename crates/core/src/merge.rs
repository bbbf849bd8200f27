//! Slide merge engine.
//!
//! Combines the default catalog with the override records held by the
//! content store into one ordered list of renderable slides. The catalog
//! decides how many slides there are and in which order; an override only
//! patches the slide at its own position.
//!
//! Precedence for a position with an override record:
//!
//! - `title`: the override document's non-empty `title`, else the record's
//!   non-empty top-level title, else the default's.
//! - `sections`: the override's `sections` array when present and well
//!   formed (an empty array counts), else the default's. Never merged
//!   element by element.
//! - `visual`: the override's non-empty `visual`, else the default's.
//! - `subtitle` / `tagline` / `presenter`: the override's string when
//!   present, else the default's.
//! - `imageUrl`: always the record's value, including an explicit null.
//!
//! The slide kind always comes from the catalog. Malformed override content
//! never fails the merge; the affected field falls back to the default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::slide::{ContentSlide, Section, SlideDocument, TitleSlide};
use crate::types::{DbId, Position, Timestamp};

/// A stored override record as read from the content store.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideOverride {
    pub id: DbId,
    pub position: Position,
    pub title: String,
    /// Opaque structured document; may be partial or malformed.
    pub content: Option<Value>,
    pub image_url: Option<String>,
    pub revision: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A fully resolved slide, ready for rendering. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideView {
    pub id: DbId,
    pub position: Position,
    /// Always equal to `content.title()`.
    pub title: String,
    pub content: SlideDocument,
    pub image_url: Option<String>,
    /// Revision of the backing record; 0 when nothing is stored yet.
    pub revision: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Merge `overrides` onto `defaults`.
///
/// Returns exactly `defaults.len()` views with positions `0..len` in order.
/// Overrides at positions outside the catalog are ignored. If two records
/// share a position the later one in `overrides` wins. Positions without a
/// record get `now` as both timestamps and the position as their id.
pub fn merge(defaults: &[SlideDocument], overrides: &[SlideOverride], now: Timestamp) -> Vec<SlideView> {
    let by_position: BTreeMap<Position, &SlideOverride> =
        overrides.iter().map(|o| (o.position, o)).collect();

    let mut views = Vec::with_capacity(defaults.len());
    for (index, default) in defaults.iter().enumerate() {
        let Ok(position) = Position::try_from(index) else {
            break;
        };
        let view = match by_position.get(&position) {
            Some(record) => overlay(default, record),
            None => fallback(default, position, now),
        };
        views.push(view);
    }
    views
}

/// The view for a position nobody has edited yet.
pub fn fallback(default: &SlideDocument, position: Position, now: Timestamp) -> SlideView {
    SlideView {
        id: DbId::from(position),
        position,
        title: default.title().to_string(),
        content: default.clone(),
        image_url: None,
        revision: 0,
        created_at: now,
        updated_at: now,
    }
}

fn overlay(default: &SlideDocument, record: &SlideOverride) -> SlideView {
    let patch = record.content.as_ref().and_then(Value::as_object);

    let title = patch
        .and_then(|p| non_empty_str(p, "title"))
        .or_else(|| Some(record.title.as_str()).filter(|t| !t.is_empty()))
        .unwrap_or_else(|| default.title())
        .to_string();

    let content = match default {
        SlideDocument::Title(base) => SlideDocument::Title(TitleSlide {
            title: title.clone(),
            subtitle: patch
                .and_then(|p| any_str(p, "subtitle"))
                .map_or_else(|| base.subtitle.clone(), str::to_string),
            tagline: patch
                .and_then(|p| any_str(p, "tagline"))
                .map_or_else(|| base.tagline.clone(), str::to_string),
            presenter: patch
                .and_then(|p| any_str(p, "presenter"))
                .map(str::to_string)
                .or_else(|| base.presenter.clone()),
        }),
        SlideDocument::Content(base) => SlideDocument::Content(ContentSlide {
            title: title.clone(),
            visual: patch
                .and_then(|p| non_empty_str(p, "visual"))
                .map(str::to_string)
                .or_else(|| base.visual.clone()),
            sections: patch
                .and_then(|p| p.get("sections"))
                .and_then(parse_sections)
                .unwrap_or_else(|| base.sections.clone()),
        }),
    };

    SlideView {
        id: record.id,
        position: record.position,
        title,
        content,
        image_url: record.image_url.clone(),
        revision: record.revision,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

fn any_str<'a>(patch: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    patch.get(key).and_then(Value::as_str)
}

fn non_empty_str<'a>(patch: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    any_str(patch, key).filter(|s| !s.is_empty())
}

/// All-or-nothing: one malformed section discards the whole override list.
fn parse_sections(value: &Value) -> Option<Vec<Section>> {
    value
        .as_array()?
        .iter()
        .map(|section| {
            if section.is_object() {
                serde_json::from_value::<Section>(section.clone()).ok()
            } else {
                None
            }
        })
        .collect()
}
