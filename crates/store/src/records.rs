//! In-memory part store with append-only transition history.
//!
//! Records and history live under a single `RwLock` so a transition
//! (status + indicator + version + history append) commits as one
//! operation with no partial state visible to readers. Reads never
//! require a lock; staleness is detectable through `version`.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use parttrack_core::error::CoreError;
use parttrack_core::lifecycle::{PartStatus, TransitionTrigger};
use parttrack_core::types::DbId;

use crate::models::{CreatePartRequest, PartRecord, Transition, UpdatePartFields};

#[derive(Default)]
struct StoreInner {
    parts: HashMap<DbId, PartRecord>,
    history: Vec<Transition>,
    next_id: DbId,
}

/// The shared record store. All mutation goes through the lifecycle
/// engine; this type only enforces record-level consistency, not lock
/// discipline.
#[derive(Default)]
pub struct PartStore {
    inner: RwLock<StoreInner>,
}

impl PartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a part. New parts start in `Pending` at version 0.
    pub async fn create(&self, input: &CreatePartRequest) -> PartRecord {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let now = Utc::now();
        let record = PartRecord {
            id: inner.next_id,
            part_number: input.part_number.clone(),
            description: input.description.clone(),
            group_key: input.group_key.clone(),
            arrival_reported: false,
            status: PartStatus::Pending,
            visual_indicator: PartStatus::Pending.visual_indicator(),
            version: 0,
            status_changed_at: now,
            created_at: now,
        };
        inner.parts.insert(record.id, record.clone());
        tracing::debug!(record_id = record.id, "Part created");
        record
    }

    /// Fetch a snapshot of one record.
    pub async fn get(&self, id: DbId) -> Option<PartRecord> {
        self.inner.read().await.parts.get(&id).cloned()
    }

    /// Snapshot of all records, ordered by id.
    pub async fn list(&self) -> Vec<PartRecord> {
        let inner = self.inner.read().await;
        let mut parts: Vec<_> = inner.parts.values().cloned().collect();
        parts.sort_by_key(|p| p.id);
        parts
    }

    /// Snapshot of all records sharing a group key.
    pub async fn group_members(&self, group_key: &str) -> Vec<PartRecord> {
        let inner = self.inner.read().await;
        inner
            .parts
            .values()
            .filter(|p| p.group_key.as_deref() == Some(group_key))
            .cloned()
            .collect()
    }

    /// Apply field edits to a record and bump its version.
    ///
    /// Lock enforcement happens in the lifecycle engine before this is
    /// called; the store itself accepts any edit.
    pub async fn apply_edit(
        &self,
        id: DbId,
        changes: &UpdatePartFields,
    ) -> Result<PartRecord, CoreError> {
        let mut inner = self.inner.write().await;
        let record = inner
            .parts
            .get_mut(&id)
            .ok_or(CoreError::NotFound { entity: "Part", id })?;

        if let Some(part_number) = &changes.part_number {
            record.part_number = part_number.clone();
        }
        if let Some(description) = &changes.description {
            record.description = description.clone();
        }
        if let Some(group_key) = &changes.group_key {
            record.group_key = Some(group_key.clone());
        }
        if let Some(arrival_reported) = changes.arrival_reported {
            record.arrival_reported = arrival_reported;
        }
        record.version += 1;

        Ok(record.clone())
    }

    /// Commit a status transition: update status, derived indicator,
    /// version, and `status_changed_at`, and append the history entry --
    /// all under one write guard.
    ///
    /// `to` must be the unique successor of the record's current status;
    /// any other target (self, backward, skipping) is rejected with
    /// `InvalidTransition` and the record is left untouched.
    pub async fn apply_transition(
        &self,
        id: DbId,
        to: PartStatus,
        triggered_by: TransitionTrigger,
    ) -> Result<(PartRecord, Transition), CoreError> {
        let mut inner = self.inner.write().await;
        let record = inner
            .parts
            .get_mut(&id)
            .ok_or(CoreError::NotFound { entity: "Part", id })?;

        let from = record.status;
        if !from.can_transition_to(to) {
            return Err(CoreError::InvalidTransition { from, to });
        }

        let now = Utc::now();
        record.status = to;
        record.visual_indicator = to.visual_indicator();
        record.version += 1;
        record.status_changed_at = now;
        let snapshot = record.clone();

        let transition = Transition {
            record_id: id,
            from_status: from,
            to_status: to,
            triggered_by,
            timestamp: now,
        };
        inner.history.push(transition.clone());

        Ok((snapshot, transition))
    }

    /// Transition history for one record, oldest first.
    pub async fn history(&self, id: DbId) -> Vec<Transition> {
        let inner = self.inner.read().await;
        inner
            .history
            .iter()
            .filter(|t| t.record_id == id)
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
