//! Route definitions for the `/records` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{locks, records};
use crate::state::AppState;

/// Record routes mounted at `/records`.
///
/// ```text
/// POST   /records                -> create
/// GET    /records                -> list
/// GET    /records/{id}           -> get_by_id
/// PATCH  /records/{id}           -> update (requires lock)
/// GET    /records/{id}/history   -> history
/// POST   /records/{id}/lock      -> acquire lock
/// DELETE /records/{id}/lock      -> release lock
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/records", post(records::create).get(records::list))
        .route(
            "/records/{id}",
            get(records::get_by_id).patch(records::update),
        )
        .route("/records/{id}/history", get(records::history))
        .route(
            "/records/{id}/lock",
            post(locks::acquire).delete(locks::release),
        )
}
