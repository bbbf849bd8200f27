use axum::routing::get;
use axum::Router;

use crate::handlers::deck;
use crate::state::AppState;

/// The deck page, mounted at root.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(deck::index))
}
