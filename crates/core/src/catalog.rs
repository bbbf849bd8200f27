//! Default content catalog.
//!
//! The catalog is the fixed, ordered list of slides shipped with the
//! application. It defines the deck's length and order; stored overrides
//! only ever patch content at positions the catalog already has.

use crate::error::CoreError;
use crate::slide::SlideDocument;
use crate::types::{DbId, Position};

/// The deck compiled into the binary.
const EMBEDDED_CATALOG: &str = include_str!("../catalog/deck.json");

/// Immutable, process-lifetime list of default slides.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultCatalog {
    slides: Vec<SlideDocument>,
}

impl DefaultCatalog {
    /// Load the deck compiled into the binary.
    pub fn embedded() -> Result<Self, CoreError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Parse a catalog from a JSON array of slide documents.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let slides: Vec<SlideDocument> = serde_json::from_str(json)
            .map_err(|e| CoreError::Validation(format!("Invalid slide catalog: {e}")))?;
        Self::from_slides(slides)
    }

    /// Build a catalog from already-parsed documents. The deck may not be empty.
    pub fn from_slides(slides: Vec<SlideDocument>) -> Result<Self, CoreError> {
        if slides.is_empty() {
            return Err(CoreError::Validation(
                "Slide catalog must contain at least one slide".to_string(),
            ));
        }
        if Position::try_from(slides.len()).is_err() {
            return Err(CoreError::Validation(format!(
                "Slide catalog has too many slides ({})",
                slides.len()
            )));
        }
        Ok(Self { slides })
    }

    pub fn slides(&self) -> &[SlideDocument] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn get(&self, position: Position) -> Option<&SlideDocument> {
        usize::try_from(position)
            .ok()
            .and_then(|index| self.slides.get(index))
    }

    /// Return the default slide at `position`, or `NotFound` when the
    /// position is outside the deck.
    pub fn require(&self, position: Position) -> Result<&SlideDocument, CoreError> {
        self.get(position).ok_or(CoreError::NotFound {
            entity: "Slide",
            id: DbId::from(position),
        })
    }
}
