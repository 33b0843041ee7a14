//! Lifecycle engine: the single mutation entry point for part records.
//!
//! Every transition and field edit passes through [`LifecycleEngine`],
//! which enforces the lock precondition against the lock manager before
//! letting the store commit anything. Concurrent callers for the same
//! record are serialized by lock possession -- a caller without the lock
//! cannot even attempt a mutation.

use std::sync::Arc;

use parttrack_core::error::CoreError;
use parttrack_core::lifecycle::{PartStatus, TransitionTrigger};
use parttrack_core::types::DbId;
use parttrack_events::bus::event_types;
use parttrack_events::{EventBus, TrackerEvent};
use parttrack_store::models::{PartRecord, Transition, UpdatePartFields};
use parttrack_store::{LockManager, PartStore};

/// Validates transitions and applies them transactionally against the
/// record store.
pub struct LifecycleEngine {
    store: Arc<PartStore>,
    locks: Arc<LockManager>,
    bus: Arc<EventBus>,
}

impl LifecycleEngine {
    pub fn new(store: Arc<PartStore>, locks: Arc<LockManager>, bus: Arc<EventBus>) -> Self {
        Self { store, locks, bus }
    }

    /// Transition a record to `to` on behalf of `actor_id`.
    ///
    /// Preconditions:
    /// - `actor_id` holds the valid lock on the record (`LockRequired`
    ///   otherwise -- including when another actor holds it; the caller
    ///   has no standing to learn more than "you don't hold the lock").
    /// - `to` is the unique successor of the current status
    ///   (`InvalidTransition` otherwise).
    ///
    /// On success the store commits status/indicator/version/history as
    /// one operation, a `part.transitioned` event is published, and --
    /// for auto-move transitions only -- the system's lock is released.
    pub async fn transition(
        &self,
        record_id: DbId,
        to: PartStatus,
        actor_id: &str,
        trigger: TransitionTrigger,
    ) -> Result<(PartRecord, Transition), CoreError> {
        self.require_lock(record_id, actor_id).await?;

        let (record, transition) = self.store.apply_transition(record_id, to, trigger).await?;

        tracing::info!(
            record_id,
            from = %transition.from_status,
            to = %transition.to_status,
            triggered_by = transition.triggered_by.kind(),
            version = record.version,
            "Part transitioned"
        );
        self.bus.publish(
            TrackerEvent::new(event_types::PART_TRANSITIONED)
                .with_record(record_id)
                .with_actor(actor_id)
                .with_payload(serde_json::json!({
                    "from": transition.from_status,
                    "to": transition.to_status,
                    "triggered_by": transition.triggered_by.kind(),
                    "visual_indicator": record.visual_indicator,
                    "version": record.version,
                })),
        );

        // System-initiated transitions do not retain the lock; user
        // transitions leave it for an explicit release.
        if matches!(transition.triggered_by, TransitionTrigger::AutoMove) {
            self.release_after_auto_move(record_id, actor_id).await;
        }

        Ok((record, transition))
    }

    /// Best-effort release of the scheduler's lock once its transition
    /// has committed. The committed transition stands even if the lock
    /// meanwhile expired or changed hands, so a failed release is logged
    /// rather than surfaced.
    async fn release_after_auto_move(&self, record_id: DbId, actor_id: &str) {
        if let Err(e) = self.locks.release(record_id, actor_id).await {
            tracing::warn!(record_id, error = %e, "Lock release after auto-move failed");
        }
    }

    /// Apply lock-gated field edits and bump the record's version.
    pub async fn edit_fields(
        &self,
        record_id: DbId,
        actor_id: &str,
        changes: &UpdatePartFields,
    ) -> Result<PartRecord, CoreError> {
        self.require_lock(record_id, actor_id).await?;
        let record = self.store.apply_edit(record_id, changes).await?;
        tracing::debug!(record_id, actor = %actor_id, version = record.version, "Part fields edited");
        Ok(record)
    }

    /// Fail with `LockRequired` unless `actor_id` holds the valid lock.
    ///
    /// The record must exist -- a missing record surfaces as `NotFound`
    /// rather than a lock error.
    async fn require_lock(&self, record_id: DbId, actor_id: &str) -> Result<(), CoreError> {
        if self.store.get(record_id).await.is_none() {
            return Err(CoreError::NotFound {
                entity: "Part",
                id: record_id,
            });
        }
        if !self.locks.holds_valid_lock(record_id, actor_id).await {
            return Err(CoreError::LockRequired { record_id });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
