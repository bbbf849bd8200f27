//! Presentation side of the pitch deck.
//!
//! - [`render`]: HTML for slides, the deck page, and capture pages.
//! - [`state`]: active slide and edit mode.
//! - [`editor`]: in-place edits, debounced saves, image upload/delete.
//! - [`api`]: client for the persistence endpoints.
//! - [`export`]: PDF, PNG and ZIP export over a rasterizer.

pub mod api;
pub mod editor;
pub mod export;
pub mod render;
pub mod state;

pub use api::{ApiError, HttpSlideApi, SlideApi};
pub use editor::{EditController, EditError, SaveOutcome};
pub use export::{DeckView, ExportError, Exporter};
pub use render::{render_deck, render_slide, RenderError};
pub use state::PresentationState;
