pub mod health;
pub mod records;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /records                      list, create
/// /records/{id}                 get, patch (lock-gated)
/// /records/{id}/history         transition history
/// /records/{id}/lock            acquire (POST), release (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(records::router())
}
