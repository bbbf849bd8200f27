//! Route definitions for the `/slides` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::slides;
use crate::state::AppState;

/// Routes mounted at `/slides`.
///
/// ```text
/// GET    /                    -> list
/// PUT    /{position}          -> upsert
/// POST   /{position}/image    -> attach_image
/// DELETE /{position}/image    -> delete_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(slides::list))
        .route("/{position}", put(slides::upsert))
        .route(
            "/{position}/image",
            post(slides::attach_image).delete(slides::delete_image),
        )
}
