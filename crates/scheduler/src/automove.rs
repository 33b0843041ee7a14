//! The periodic auto-move evaluation loop.
//!
//! Each cycle inspects every record that is not locked by a human
//! actor, evaluates the trigger for its current status, and -- when the
//! condition holds -- takes a short-lived system lock and requests the
//! transition through the lifecycle engine. A `LockConflict` (a human
//! just grabbed the record) skips the record for this cycle; it is
//! retried on the next. Per-record failures are logged and isolated,
//! never fatal to the cycle.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use parttrack_core::error::CoreError;
use parttrack_core::lifecycle::TransitionTrigger;
use parttrack_core::locking::{is_system_actor, SYSTEM_ACTOR};
use parttrack_engine::LifecycleEngine;
use parttrack_store::models::PartRecord;
use parttrack_store::{LockManager, PartStore};

use crate::config::SchedulerConfig;
use crate::triggers::TriggerSet;

/// Outcome counts for one evaluation cycle.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Records successfully transitioned.
    pub transitioned: usize,
    /// Records skipped because a human holds their lock (or one was
    /// acquired mid-cycle).
    pub skipped_locked: usize,
    /// Records skipped because trigger data was unavailable.
    pub skipped_unavailable: usize,
    /// Records whose move failed for any other reason.
    pub failed: usize,
}

/// Periodically evaluates trigger conditions and requests transitions
/// through the lifecycle engine, subject to the same locking discipline
/// as every other actor.
pub struct AutoMoveScheduler {
    store: Arc<PartStore>,
    locks: Arc<LockManager>,
    engine: Arc<LifecycleEngine>,
    triggers: TriggerSet,
    config: SchedulerConfig,
}

impl AutoMoveScheduler {
    pub fn new(
        store: Arc<PartStore>,
        locks: Arc<LockManager>,
        engine: Arc<LifecycleEngine>,
        config: SchedulerConfig,
    ) -> Self {
        let triggers = TriggerSet::new(config.calllist_wait_secs);
        Self {
            store,
            locks,
            engine,
            triggers,
            config,
        }
    }

    /// Run the evaluation loop until `cancel` is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            interval_secs = self.config.interval_secs,
            calllist_wait_secs = self.config.calllist_wait_secs,
            "Auto-move scheduler started"
        );

        let mut interval = tokio::time::interval(Duration::from_secs(self.config.interval_secs));

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Auto-move scheduler stopping");
                    break;
                }
                _ = interval.tick() => {
                    let stats = self.evaluate_once().await;
                    if stats.transitioned > 0 || stats.failed > 0 {
                        tracing::info!(
                            transitioned = stats.transitioned,
                            skipped_locked = stats.skipped_locked,
                            skipped_unavailable = stats.skipped_unavailable,
                            failed = stats.failed,
                            "Auto-move cycle complete"
                        );
                    } else {
                        tracing::debug!("Auto-move cycle: nothing to do");
                    }
                }
            }
        }
    }

    /// Evaluate every record once. Also used directly by tests and by
    /// callers that want an on-demand sweep.
    pub async fn evaluate_once(&self) -> CycleStats {
        let mut stats = CycleStats::default();
        for record in self.store.list().await {
            self.try_move(&record, &mut stats).await;
        }
        stats
    }

    /// Attempt one record's auto-move. `record` is the cycle's snapshot;
    /// the trigger condition is re-checked under the system lock, so a
    /// human edit made after the snapshot is never overridden.
    async fn try_move(&self, record: &PartRecord, stats: &mut CycleStats) {
        let Some(target) = record.status.successor() else {
            return;
        };

        // Never touch a record a human actor is editing.
        if let Some(info) = self.locks.status(record.id).await {
            if !is_system_actor(&info.holder_id) {
                stats.skipped_locked += 1;
                return;
            }
        }

        let Some(trigger) = self.triggers.for_status(record.status) else {
            return;
        };

        match trigger.evaluate(record, &self.store).await {
            Ok(false) => return,
            Ok(true) => {}
            Err(CoreError::TriggerDataUnavailable { record_id, reason }) => {
                tracing::warn!(record_id, %reason, "Auto-move: trigger data unavailable, skipping");
                stats.skipped_unavailable += 1;
                return;
            }
            Err(e) => {
                tracing::error!(record_id = record.id, error = %e, "Auto-move: trigger evaluation failed");
                stats.failed += 1;
                return;
            }
        }

        match self
            .locks
            .acquire(record.id, SYSTEM_ACTOR, self.config.system_lock_ttl_secs)
            .await
        {
            Ok(_) => {}
            Err(CoreError::LockConflict { record_id, held_by, .. }) => {
                // A human acquired the lock between our check and now;
                // retry on the next cycle.
                tracing::debug!(record_id, holder = %held_by, "Auto-move: record locked, retrying next cycle");
                stats.skipped_locked += 1;
                return;
            }
            Err(e) => {
                tracing::error!(record_id = record.id, error = %e, "Auto-move: lock acquisition failed");
                stats.failed += 1;
                return;
            }
        }

        // The snapshot predates the lock. Re-read and re-evaluate under
        // it: an edit in that window (say, the arrival flag reverted)
        // must cancel the move.
        let Some(fresh) = self.store.get(record.id).await else {
            let _ = self.locks.release(record.id, SYSTEM_ACTOR).await;
            return;
        };
        let still_ready = fresh.status == record.status
            && matches!(trigger.evaluate(&fresh, &self.store).await, Ok(true));
        if !still_ready {
            tracing::debug!(record_id = record.id, "Auto-move: condition changed under lock, skipping");
            let _ = self.locks.release(record.id, SYSTEM_ACTOR).await;
            return;
        }

        match self
            .engine
            .transition(record.id, target, SYSTEM_ACTOR, TransitionTrigger::AutoMove)
            .await
        {
            Ok((updated, _)) => {
                tracing::info!(
                    record_id = updated.id,
                    to = %updated.status,
                    "Auto-move: part transitioned"
                );
                stats.transitioned += 1;
            }
            Err(e) => {
                tracing::error!(record_id = record.id, error = %e, "Auto-move: transition failed");
                // The engine only releases the system lock on success.
                let _ = self.locks.release(record.id, SYSTEM_ACTOR).await;
                stats.failed += 1;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
