//! Actor-identity extractor for Axum handlers.
//!
//! Authentication is handled upstream of this service; requests arrive
//! with an opaque actor id in the `x-actor-id` header. The reserved
//! `"system"` id belongs to the auto-move scheduler and is rejected on
//! the HTTP surface.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use parttrack_core::locking::{is_system_actor, validate_actor_id};

use crate::error::AppError;
use crate::state::AppState;

/// The acting user extracted from the `x-actor-id` header.
///
/// Use this as an extractor parameter in any handler that mutates a
/// record or manipulates its lock:
///
/// ```ignore
/// async fn my_handler(actor: ActorId) -> AppResult<Json<()>> {
///     tracing::info!(actor = %actor.0, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ActorId(pub String);

impl FromRequestParts<AppState> for ActorId {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let actor_id = parts
            .headers
            .get(crate::router::ACTOR_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::BadRequest("Missing x-actor-id header".into()))?;

        validate_actor_id(actor_id).map_err(AppError::BadRequest)?;

        if is_system_actor(actor_id) {
            return Err(AppError::BadRequest(
                "The 'system' actor id is reserved for the scheduler".into(),
            ));
        }

        Ok(ActorId(actor_id.to_string()))
    }
}
