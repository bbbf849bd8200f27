//! Slide override rows and DTOs.

use pitchdeck_core::merge::SlideOverride;
use pitchdeck_core::types::{DbId, Position, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `slides` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideRow {
    pub id: DbId,
    pub position: Position,
    pub title: String,
    /// Opaque slide document; may be partial.
    pub content: Option<serde_json::Value>,
    pub image_url: Option<String>,
    pub revision: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<SlideRow> for SlideOverride {
    fn from(row: SlideRow) -> Self {
        Self {
            id: row.id,
            position: row.position,
            title: row.title,
            content: row.content,
            image_url: row.image_url,
            revision: row.revision,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// Body of `PUT /api/slides/{position}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertSlide {
    #[serde(default)]
    pub title: String,
    pub content: serde_json::Value,
    /// Revision the writer believes it is producing. Writes carrying a
    /// revision lower than the stored one are rejected; `None` always wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<i64>,
}

/// Body of `POST /api/slides/{position}/image`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachImage {
    pub image_url: String,
}
