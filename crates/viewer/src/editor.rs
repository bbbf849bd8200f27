//! Edit/Save Controller.
//!
//! Holds the canonical document for every slide and applies edits to it.
//! Edits schedule a debounced save per slide; focus loss saves at once.
//! Each save carries a revision one above anything this controller has
//! issued for that slide, so the server can refuse a save that arrives
//! after a newer one. A refusal is [`SaveOutcome::Superseded`] only when
//! this controller has already issued a newer save for the slide. When the
//! server holds a revision the controller never saw (another editor, or a
//! deck loaded from the fallback catalog) the save is a failure, and the
//! controller moves its revision past the stored one so the next save
//! goes through.
//!
//! Failed saves are logged and left alone. The next edit schedules a new
//! save with the current document, which retries naturally.

use std::time::Instant;

use pitchdeck_core::catalog::DefaultCatalog;
use pitchdeck_core::edit::{apply_edit, Debouncer, EditMode, EditTarget};
use pitchdeck_core::error::CoreError;
use pitchdeck_core::merge::{self, SlideView};
use pitchdeck_core::types::Position;
use pitchdeck_core::upload::{self, MAX_IMAGE_BYTES};

use crate::api::{ApiError, SaveRequest, SavedSlide, SlideApi};
use crate::render::{render_slide, render_visual, RenderError};
use crate::state::PresentationState;

#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("Editing is not enabled")]
    NotEditing,

    #[error("No slide at position {0}")]
    UnknownPosition(Position),

    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// Refused before anything was sent.
    #[error("Upload rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { revision: i64 },
    /// A newer save from this controller for the same slide won.
    Superseded,
    Failed(String),
}

/// A save that has been issued but not yet completed.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSave {
    pub position: Position,
    pub request: SaveRequest,
}

impl PendingSave {
    pub fn revision(&self) -> i64 {
        self.request.revision.unwrap_or_default()
    }
}

struct SlideEntry {
    view: SlideView,
    /// Highest revision the server has confirmed.
    confirmed: i64,
    /// Highest revision handed to a save.
    issued: i64,
}

pub struct EditController<A> {
    api: A,
    slides: Vec<SlideEntry>,
    debouncer: Debouncer,
}

impl<A: SlideApi> EditController<A> {
    pub fn new(api: A, views: Vec<SlideView>) -> Self {
        let slides = views
            .into_iter()
            .map(|view| SlideEntry {
                confirmed: view.revision,
                issued: view.revision,
                view,
            })
            .collect();
        Self {
            api,
            slides,
            debouncer: Debouncer::default(),
        }
    }

    /// Fetch the deck, falling back to the catalog when the server is
    /// unreachable.
    pub async fn load(api: A, catalog: &DefaultCatalog) -> Self {
        let views = match api.list_slides().await {
            Ok(views) => views,
            Err(e) => {
                tracing::warn!(error = %e, "Slide fetch failed, using default deck");
                merge::merge(catalog.slides(), &[], chrono::Utc::now())
            }
        };
        Self::new(api, views)
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn views(&self) -> Vec<SlideView> {
        self.slides.iter().map(|s| s.view.clone()).collect()
    }

    pub fn view(&self, position: Position) -> Option<&SlideView> {
        self.entry(position).ok().map(|s| &s.view)
    }

    pub fn is_pending(&self, position: Position) -> bool {
        self.debouncer.is_pending(position)
    }

    /// Earliest time a debounced save becomes due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.next_deadline()
    }

    fn entry(&self, position: Position) -> Result<&SlideEntry, EditError> {
        usize::try_from(position)
            .ok()
            .and_then(|i| self.slides.get(i))
            .ok_or(EditError::UnknownPosition(position))
    }

    fn entry_mut(&mut self, position: Position) -> Result<&mut SlideEntry, EditError> {
        usize::try_from(position)
            .ok()
            .and_then(|i| self.slides.get_mut(i))
            .ok_or(EditError::UnknownPosition(position))
    }

    // -----------------------------------------------------------------------
    // Mode
    // -----------------------------------------------------------------------

    /// Toggle edit mode. Leaving edit mode makes pending saves due at
    /// `now` so the next [`flush_due`](Self::flush_due) sends them; it does
    /// not wait for them.
    pub fn toggle(&mut self, state: &mut PresentationState, now: Instant) -> EditMode {
        let mode = state.toggle_mode();
        if !mode.is_editing() {
            self.debouncer.expedite_all(now);
        }
        mode
    }

    // -----------------------------------------------------------------------
    // Text edits
    // -----------------------------------------------------------------------

    /// Apply an edit from the node tagged `position` / `target` and
    /// schedule a debounced save.
    pub fn edit(
        &mut self,
        state: &PresentationState,
        position: Position,
        target: EditTarget,
        text: String,
        now: Instant,
    ) -> Result<(), EditError> {
        if !state.editing() {
            return Err(EditError::NotEditing);
        }
        let entry = self.entry_mut(position)?;
        apply_edit(&mut entry.view.content, target, text)?;
        entry.view.title = entry.view.content.title().to_string();
        self.debouncer.touch(position, now);
        Ok(())
    }

    /// Focus left an editable node: cancel the pending timer and save now.
    pub async fn blur(
        &mut self,
        state: &PresentationState,
        position: Position,
    ) -> Result<SaveOutcome, EditError> {
        if !state.editing() {
            return Err(EditError::NotEditing);
        }
        self.debouncer.cancel(position);
        self.save(position).await
    }

    /// Send every save whose quiet period has elapsed, one at a time.
    pub async fn flush_due(&mut self, now: Instant) -> Vec<(Position, SaveOutcome)> {
        let due = self.debouncer.take_due(now);
        let mut outcomes = Vec::with_capacity(due.len());
        for position in due {
            match self.save(position).await {
                Ok(outcome) => outcomes.push((position, outcome)),
                Err(e) => {
                    tracing::warn!(position, error = %e, "Skipping save");
                }
            }
        }
        outcomes
    }

    // -----------------------------------------------------------------------
    // Saves
    // -----------------------------------------------------------------------

    pub async fn save(&mut self, position: Position) -> Result<SaveOutcome, EditError> {
        let pending = self.begin_save(position)?;
        let result = self.api.save_slide(position, &pending.request).await;
        Ok(self.finish_save(&pending, result))
    }

    /// Snapshot the current document into a save with a fresh revision.
    pub fn begin_save(&mut self, position: Position) -> Result<PendingSave, EditError> {
        let entry = self.entry_mut(position)?;
        entry.issued = entry.issued.max(entry.confirmed) + 1;
        Ok(PendingSave {
            position,
            request: SaveRequest {
                title: entry.view.content.title().to_string(),
                content: entry.view.content.clone(),
                revision: Some(entry.issued),
            },
        })
    }

    /// Record the result of a save issued by [`begin_save`](Self::begin_save).
    ///
    /// A completion older than one already confirmed does not move the
    /// slide's state backwards.
    pub fn finish_save(
        &mut self,
        pending: &PendingSave,
        result: Result<SavedSlide, ApiError>,
    ) -> SaveOutcome {
        let position = pending.position;
        let Ok(entry) = self.entry_mut(position) else {
            return SaveOutcome::Failed(format!("No slide at position {position}"));
        };

        match result {
            Ok(saved) if saved.revision < entry.confirmed => {
                tracing::debug!(position, revision = saved.revision, "Late save completion ignored");
                SaveOutcome::Superseded
            }
            Ok(saved) => {
                entry.confirmed = saved.revision;
                entry.view.id = saved.id;
                entry.view.revision = saved.revision;
                entry.view.created_at = saved.created_at;
                entry.view.updated_at = saved.updated_at;
                tracing::debug!(position, revision = saved.revision, "Slide saved");
                SaveOutcome::Saved {
                    revision: saved.revision,
                }
            }
            Err(e) if e.is_conflict() => {
                let newer_issued = pending.revision() < entry.issued;
                if let Some(stored) = e.stored_revision() {
                    entry.issued = entry.issued.max(stored);
                }
                if newer_issued {
                    tracing::debug!(position, revision = pending.revision(), "Save superseded");
                    return SaveOutcome::Superseded;
                }
                tracing::warn!(
                    position,
                    revision = pending.revision(),
                    stored = ?e.stored_revision(),
                    "Slide save rejected as stale"
                );
                SaveOutcome::Failed(e.to_string())
            }
            Err(e) => {
                tracing::warn!(position, error = %e, "Slide save failed");
                SaveOutcome::Failed(e.to_string())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Images
    // -----------------------------------------------------------------------

    /// Upload an image and attach it to the slide. Returns the refreshed
    /// image region markup.
    pub async fn upload_image(
        &mut self,
        state: &PresentationState,
        position: Position,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    ) -> Result<String, EditError> {
        if !state.editing() {
            return Err(EditError::NotEditing);
        }
        self.entry(position)?;
        upload::precheck(&content_type, bytes.len(), MAX_IMAGE_BYTES)
            .map_err(|e| EditError::Rejected(e.to_string()))?;

        let image_url = self.api.upload_image(file_name, content_type, bytes).await?;
        let saved = self.api.attach_image(position, &image_url).await?;
        tracing::info!(position, image_url = %image_url, "Image attached");

        self.entry_mut(position)?.view.image_url = saved.image_url;
        self.visual_fragment(state, position)
    }

    /// Remove the slide's image. Returns the refreshed image region markup.
    pub async fn delete_image(
        &mut self,
        state: &PresentationState,
        position: Position,
    ) -> Result<String, EditError> {
        if !state.editing() {
            return Err(EditError::NotEditing);
        }
        self.entry(position)?;
        let saved = self.api.delete_image(position).await?;
        tracing::info!(position, "Image removed");

        self.entry_mut(position)?.view.image_url = saved.image_url;
        self.visual_fragment(state, position)
    }

    /// Current markup of one slide's image region.
    pub fn visual_fragment(&self, state: &PresentationState, position: Position) -> Result<String, EditError> {
        let entry = self.entry(position)?;
        Ok(render_visual(&entry.view, state.editing())?)
    }

    /// Current markup of one slide.
    pub fn slide_fragment(&self, state: &PresentationState, position: Position) -> Result<String, EditError> {
        let entry = self.entry(position)?;
        let index = usize::try_from(position).unwrap_or_default();
        Ok(render_slide(&entry.view, state.editing(), state.is_active(index))?)
    }
}
