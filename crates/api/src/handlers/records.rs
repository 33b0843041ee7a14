//! Handlers for the `/records` resource: part creation, reads, lock-gated
//! edits and transitions, and transition history.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use parttrack_core::lifecycle::{PartStatus, TransitionTrigger};
use parttrack_core::types::{DbId, Timestamp};
use parttrack_store::models::{CreatePartRequest, PartRecord, Transition, UpdatePartFields};

use crate::error::{AppError, AppResult};
use crate::middleware::actor::ActorId;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// A part record plus its lock presence. The holder's token is never
/// exposed here.
#[derive(Debug, Serialize)]
pub struct PartView {
    #[serde(flatten)]
    pub part: PartRecord,
    pub locked: bool,
    pub lock_expires_at: Option<Timestamp>,
}

/// PATCH body: field edits and/or a status transition, all gated on the
/// caller holding the record's lock.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePartRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub fields: UpdatePartFields,

    /// Requested transition target. Must be the unique successor of the
    /// record's current status.
    pub status: Option<PartStatus>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/records
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreatePartRequest>,
) -> AppResult<(StatusCode, Json<PartRecord>)> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let part = state.store.create(&input).await;
    Ok((StatusCode::CREATED, Json(part)))
}

/// GET /api/v1/records
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<PartRecord>>> {
    Ok(Json(state.store.list().await))
}

/// GET /api/v1/records/{id}
///
/// Reads never require a lock; `version` lets callers detect staleness.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<PartView>> {
    let part = state.store.get(id).await.ok_or(AppError::Core(
        parttrack_core::error::CoreError::NotFound { entity: "Part", id },
    ))?;

    let lock = state.locks.status(id).await;
    Ok(Json(PartView {
        part,
        locked: lock.is_some(),
        lock_expires_at: lock.map(|l| l.expires_at),
    }))
}

/// PATCH /api/v1/records/{id}
///
/// Requires the caller to hold the record's lock. The status target
/// (if any) is validated before anything is applied; a rejected
/// transition commits nothing, not even the accompanying edits. Field
/// edits then apply first, followed by the transition.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    actor: ActorId,
    Json(input): Json<UpdatePartRequest>,
) -> AppResult<Json<PartRecord>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if input.fields.is_empty() && input.status.is_none() {
        return Err(AppError::BadRequest("No changes requested".into()));
    }

    // An impossible status target rejects the whole request up front:
    // the edits and the transition land together or not at all.
    if let Some(to) = input.status {
        let current = state.store.get(id).await.ok_or(AppError::Core(
            parttrack_core::error::CoreError::NotFound { entity: "Part", id },
        ))?;
        if !current.status.can_transition_to(to) {
            return Err(AppError::Core(
                parttrack_core::error::CoreError::InvalidTransition {
                    from: current.status,
                    to,
                },
            ));
        }
    }

    let mut record = None;
    if !input.fields.is_empty() {
        record = Some(state.engine.edit_fields(id, &actor.0, &input.fields).await?);
    }

    if let Some(to) = input.status {
        let (updated, _) = state
            .engine
            .transition(
                id,
                to,
                &actor.0,
                TransitionTrigger::User {
                    actor_id: actor.0.clone(),
                },
            )
            .await?;
        record = Some(updated);
    }

    // At least one branch ran; both set `record`.
    record
        .map(Json)
        .ok_or_else(|| AppError::InternalError("No update applied".into()))
}

/// GET /api/v1/records/{id}/history
///
/// Transition history, oldest first. History is append-only and
/// immutable.
pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Transition>>> {
    if state.store.get(id).await.is_none() {
        return Err(AppError::Core(
            parttrack_core::error::CoreError::NotFound { entity: "Part", id },
        ));
    }
    Ok(Json(state.store.history(id).await))
}
