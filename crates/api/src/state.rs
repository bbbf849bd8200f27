use std::sync::Arc;

use pitchdeck_core::catalog::DefaultCatalog;
use pitchdeck_db::SlideStore;

use crate::config::ServerConfig;
use crate::uploads::UploadStorage;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Slide override storage (PostgreSQL or in-memory).
    pub store: Arc<dyn SlideStore>,
    /// Default slides, fixed for the process lifetime.
    pub catalog: Arc<DefaultCatalog>,
    /// Local storage for uploaded images.
    pub uploads: Arc<UploadStorage>,
    pub config: Arc<ServerConfig>,
}
