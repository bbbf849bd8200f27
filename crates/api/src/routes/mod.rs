pub mod deck;
pub mod health;
pub mod slides;
pub mod uploads;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// GET    /slides                     merged deck
/// PUT    /slides/{position}          upsert override
/// POST   /slides/{position}/image    attach image
/// DELETE /slides/{position}/image    clear image
/// POST   /upload/image               multipart upload
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .nest("/slides", slides::router())
        .nest("/upload", uploads::router(config.max_upload_bytes))
}
