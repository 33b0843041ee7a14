//! Handlers for record lock acquisition and release.
//!
//! Locks gate all mutation: a user acquires the lock, edits through
//! `PATCH /records/{id}`, then releases. Acquisition is non-blocking --
//! a 409 tells the caller who holds the record and until when, so they
//! can decide whether to wait or escalate.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use parttrack_core::error::CoreError;
use parttrack_core::types::{DbId, Timestamp};

use crate::error::{AppError, AppResult};
use crate::middleware::actor::ActorId;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response body for a granted lock. The token identifies this grant
/// and is only ever returned to the acquirer.
#[derive(Debug, Serialize)]
pub struct LockGrant {
    pub granted: bool,
    pub token: String,
    pub expires_at: Timestamp,
}

/// POST /api/v1/records/{id}/lock
///
/// Acquire (or renew, for the current holder) the exclusive edit lock.
/// Returns 409 with `held_by`/`expires_at` if another actor holds it.
pub async fn acquire(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    actor: ActorId,
) -> AppResult<Json<DataResponse<LockGrant>>> {
    // Locks are only meaningful on existing records.
    if state.store.get(id).await.is_none() {
        return Err(AppError::Core(CoreError::NotFound { entity: "Part", id }));
    }

    let lock = state
        .locks
        .acquire(id, &actor.0, state.config.lock_ttl_secs)
        .await?;

    Ok(Json(DataResponse {
        data: LockGrant {
            granted: true,
            token: lock.token,
            expires_at: lock.expires_at,
        },
    }))
}

/// DELETE /api/v1/records/{id}/lock
///
/// Release a held lock. Only the holder can release; releasing an
/// unlocked record is an idempotent 204.
pub async fn release(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    actor: ActorId,
) -> AppResult<StatusCode> {
    if state.store.get(id).await.is_none() {
        return Err(AppError::Core(CoreError::NotFound { entity: "Part", id }));
    }

    state.locks.release(id, &actor.0).await?;
    Ok(StatusCode::NO_CONTENT)
}
