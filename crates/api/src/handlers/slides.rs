//! Handlers for the `/slides` resource.
//!
//! Slides are addressed by catalog position. Reads merge stored overrides
//! onto the default catalog; writes patch one position at a time.

use axum::extract::{Path, State};
use axum::Json;
use pitchdeck_core::error::CoreError;
use pitchdeck_core::merge::{merge, SlideOverride, SlideView};
use pitchdeck_core::types::Position;
use pitchdeck_db::models::slide::{AttachImage, SlideRow, UpsertSlide};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// The merged deck. Falls back to the bare catalog when the store does not
/// answer, so the deck is always complete.
pub(crate) async fn merged_views(state: &AppState) -> Vec<SlideView> {
    let overrides: Vec<SlideOverride> = match state.store.list().await {
        Ok(rows) => rows.into_iter().map(SlideOverride::from).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Content store unavailable, serving default slides");
            Vec::new()
        }
    };
    merge(state.catalog.slides(), &overrides, chrono::Utc::now())
}

/// GET /api/slides
pub async fn list(State(state): State<AppState>) -> Json<Vec<SlideView>> {
    Json(merged_views(&state).await)
}

/// PUT /api/slides/{position}
///
/// Upserts the override at `position`. Returns 409 when the body carries a
/// revision older than the stored one.
pub async fn upsert(
    State(state): State<AppState>,
    Path(position): Path<Position>,
    Json(input): Json<UpsertSlide>,
) -> AppResult<Json<SlideRow>> {
    state.catalog.require(position)?;
    if !input.content.is_object() {
        return Err(AppError::BadRequest("content must be a JSON object".into()));
    }

    let row = state.store.upsert(position, &input).await?;
    tracing::debug!(position, revision = row.revision, "Saved slide");
    Ok(Json(row))
}

/// POST /api/slides/{position}/image
///
/// Points the slide at an uploaded image, creating the override from the
/// default slide when none exists yet.
pub async fn attach_image(
    State(state): State<AppState>,
    Path(position): Path<Position>,
    Json(input): Json<AttachImage>,
) -> AppResult<Json<SlideRow>> {
    let seed = state.catalog.require(position)?;
    let image_url = input.image_url.trim();
    if image_url.is_empty() {
        return Err(AppError::BadRequest("imageUrl is required".into()));
    }

    let row = state.store.attach_image(position, seed, image_url).await?;
    tracing::info!(position, image_url, "Attached slide image");
    Ok(Json(row))
}

/// DELETE /api/slides/{position}/image
///
/// Clears the image reference and removes the file when it was stored
/// locally. A file that cannot be removed is logged, not reported.
pub async fn delete_image(
    State(state): State<AppState>,
    Path(position): Path<Position>,
) -> AppResult<Json<SlideRow>> {
    state.catalog.require(position)?;
    let cleared = state
        .store
        .clear_image(position)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Slide",
            id: position.into(),
        }))?;

    if let Some(previous) = cleared.previous.as_deref() {
        match state.uploads.remove(previous).await {
            Ok(removed) => tracing::info!(position, image_url = previous, removed, "Cleared slide image"),
            Err(e) => tracing::warn!(position, image_url = previous, error = %e, "Failed to delete image file"),
        }
    }
    Ok(Json(cleared.record))
}
