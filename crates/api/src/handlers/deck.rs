//! Server-rendered deck page.

use axum::extract::State;
use axum::response::Html;
use pitchdeck_viewer::render::render_deck;
use pitchdeck_viewer::state::PresentationState;

use crate::error::{AppError, AppResult};
use crate::handlers::slides::merged_views;
use crate::state::AppState;

/// Page title when the first slide has none.
const DEFAULT_DECK_TITLE: &str = "Pitch Deck";

/// GET /
///
/// The merged deck in viewing mode with the first slide active.
pub async fn index(State(state): State<AppState>) -> AppResult<Html<String>> {
    let views = merged_views(&state).await;
    let presentation = PresentationState::new(views.len());
    let deck_title = views
        .first()
        .map(|v| v.title.as_str())
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_DECK_TITLE);

    let html = render_deck(deck_title, &views, &presentation)
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    Ok(Html(html))
}
