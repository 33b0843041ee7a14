use crate::lifecycle::PartStatus;
use crate::types::{DbId, Timestamp};

/// Domain error taxonomy shared by the store, engine, scheduler, and API.
///
/// Lock conflicts and invalid transitions are expected, recoverable
/// business conditions -- callers surface them, they never crash the
/// process.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Another actor holds a valid lock on the record. The caller may
    /// retry after `expires_at`.
    #[error("Record {record_id} is locked by {held_by} until {expires_at}")]
    LockConflict {
        record_id: DbId,
        held_by: String,
        expires_at: Timestamp,
    },

    /// A mutation was attempted without holding the record's lock.
    #[error("Record {record_id} requires an active lock for this operation")]
    LockRequired { record_id: DbId },

    /// A release (or lock-gated mutation) was attempted by an actor that
    /// is not the current holder.
    #[error("Actor is not the lock holder for record {record_id}")]
    NotOwner { record_id: DbId },

    /// The requested status change violates the forward-only ordering.
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: PartStatus, to: PartStatus },

    /// The data needed to evaluate an auto-move trigger was missing.
    /// Scheduler-internal: the record is skipped for the cycle.
    #[error("Trigger data unavailable for record {record_id}: {reason}")]
    TriggerDataUnavailable { record_id: DbId, reason: String },
}
