//! Route definitions for `/upload`.

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;

use crate::handlers::uploads;
use crate::state::AppState;

/// Room for multipart boundaries and part headers on top of the file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Routes mounted at `/upload`.
///
/// The body limit is raised so oversize files reach validation and get a
/// JSON error instead of a bare 413.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/image", post(uploads::upload_image))
        .layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD))
}
