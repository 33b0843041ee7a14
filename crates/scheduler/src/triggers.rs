//! Auto-move trigger conditions.
//!
//! One pluggable predicate per status decides whether a record is ready
//! for its next transition. New trigger rules slot in behind the
//! [`Trigger`] trait without touching the state machine.

use async_trait::async_trait;
use chrono::{Duration, Utc};

use parttrack_core::error::CoreError;
use parttrack_core::lifecycle::PartStatus;
use parttrack_store::models::PartRecord;
use parttrack_store::PartStore;

/// A trigger condition for one lifecycle edge.
///
/// `evaluate` answers "is this record ready to move to its successor
/// status right now?". `TriggerDataUnavailable` means the inputs needed
/// for the decision are missing -- the scheduler skips the record for
/// the cycle and retries next time.
#[async_trait]
pub trait Trigger: Send + Sync {
    async fn evaluate(&self, record: &PartRecord, store: &PartStore) -> Result<bool, CoreError>;
}

// ---------------------------------------------------------------------------
// Pending -> Arrived
// ---------------------------------------------------------------------------

/// Fires once an editor has marked the part as physically arrived.
pub struct ArrivalReported;

#[async_trait]
impl Trigger for ArrivalReported {
    async fn evaluate(&self, record: &PartRecord, _store: &PartStore) -> Result<bool, CoreError> {
        Ok(record.arrival_reported)
    }
}

// ---------------------------------------------------------------------------
// Arrived -> Available
// ---------------------------------------------------------------------------

/// Fires once every part sharing the record's group key has arrived.
///
/// A record with no group key cannot be evaluated (there is no group to
/// check) and is reported as `TriggerDataUnavailable`.
pub struct GroupArrived;

#[async_trait]
impl Trigger for GroupArrived {
    async fn evaluate(&self, record: &PartRecord, store: &PartStore) -> Result<bool, CoreError> {
        let Some(group_key) = record.group_key.as_deref() else {
            return Err(CoreError::TriggerDataUnavailable {
                record_id: record.id,
                reason: "part has no group key".into(),
            });
        };

        let members = store.group_members(group_key).await;
        Ok(members.iter().all(|p| p.status >= PartStatus::Arrived))
    }
}

// ---------------------------------------------------------------------------
// Available -> CallList
// ---------------------------------------------------------------------------

/// Fires once the record has sat in `Available`, un-actioned, for the
/// configured waiting window.
pub struct WaitWindowElapsed {
    wait: Duration,
}

impl WaitWindowElapsed {
    pub fn new(wait_secs: i64) -> Self {
        Self {
            wait: Duration::seconds(wait_secs),
        }
    }
}

#[async_trait]
impl Trigger for WaitWindowElapsed {
    async fn evaluate(&self, record: &PartRecord, _store: &PartStore) -> Result<bool, CoreError> {
        Ok(Utc::now() - record.status_changed_at >= self.wait)
    }
}

// ---------------------------------------------------------------------------
// TriggerSet
// ---------------------------------------------------------------------------

/// The registered trigger per status. Terminal statuses have none.
pub struct TriggerSet {
    arrival: ArrivalReported,
    group: GroupArrived,
    wait: WaitWindowElapsed,
}

impl TriggerSet {
    pub fn new(calllist_wait_secs: i64) -> Self {
        Self {
            arrival: ArrivalReported,
            group: GroupArrived,
            wait: WaitWindowElapsed::new(calllist_wait_secs),
        }
    }

    /// The trigger that guards the edge out of `status`, if any.
    pub fn for_status(&self, status: PartStatus) -> Option<&dyn Trigger> {
        match status {
            PartStatus::Pending => Some(&self.arrival),
            PartStatus::Arrived => Some(&self.group),
            PartStatus::Available => Some(&self.wait),
            PartStatus::CallList => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use parttrack_core::lifecycle::TransitionTrigger;
    use parttrack_store::models::CreatePartRequest;

    async fn create_part(store: &PartStore, group_key: Option<&str>) -> PartRecord {
        store
            .create(&CreatePartRequest {
                part_number: "BRK-001".into(),
                description: String::new(),
                group_key: group_key.map(String::from),
            })
            .await
    }

    async fn advance(store: &PartStore, id: i64, to: PartStatus) -> PartRecord {
        store
            .apply_transition(id, to, TransitionTrigger::AutoMove)
            .await
            .unwrap()
            .0
    }

    // -----------------------------------------------------------------------
    // ArrivalReported
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn arrival_trigger_follows_the_reported_flag() {
        let store = PartStore::new();
        let part = create_part(&store, None).await;

        assert!(!ArrivalReported.evaluate(&part, &store).await.unwrap());

        let part = store
            .apply_edit(
                part.id,
                &parttrack_store::models::UpdatePartFields {
                    arrival_reported: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(ArrivalReported.evaluate(&part, &store).await.unwrap());
    }

    // -----------------------------------------------------------------------
    // GroupArrived
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn group_trigger_without_group_key_is_unavailable() {
        let store = PartStore::new();
        let part = create_part(&store, None).await;

        let result = GroupArrived.evaluate(&part, &store).await;
        assert_matches!(result, Err(CoreError::TriggerDataUnavailable { .. }));
    }

    #[tokio::test]
    async fn group_trigger_waits_for_every_member() {
        let store = PartStore::new();
        let a = create_part(&store, Some("VIN-123")).await;
        let b = create_part(&store, Some("VIN-123")).await;

        let a = advance(&store, a.id, PartStatus::Arrived).await;

        // b is still Pending -- the group is not complete.
        assert!(!GroupArrived.evaluate(&a, &store).await.unwrap());

        advance(&store, b.id, PartStatus::Arrived).await;
        assert!(GroupArrived.evaluate(&a, &store).await.unwrap());
    }

    #[tokio::test]
    async fn group_trigger_counts_members_past_arrived() {
        let store = PartStore::new();
        let a = create_part(&store, Some("VIN-123")).await;
        let b = create_part(&store, Some("VIN-123")).await;

        let a = advance(&store, a.id, PartStatus::Arrived).await;
        advance(&store, b.id, PartStatus::Arrived).await;
        advance(&store, b.id, PartStatus::Available).await;

        // A member that already moved on still counts as arrived.
        assert!(GroupArrived.evaluate(&a, &store).await.unwrap());
    }

    // -----------------------------------------------------------------------
    // WaitWindowElapsed
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn wait_window_zero_fires_immediately() {
        let store = PartStore::new();
        let part = create_part(&store, None).await;

        assert!(WaitWindowElapsed::new(0)
            .evaluate(&part, &store)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn wait_window_not_yet_elapsed_does_not_fire() {
        let store = PartStore::new();
        let part = create_part(&store, None).await;

        assert!(!WaitWindowElapsed::new(3600)
            .evaluate(&part, &store)
            .await
            .unwrap());
    }

    // -----------------------------------------------------------------------
    // TriggerSet
    // -----------------------------------------------------------------------

    #[test]
    fn terminal_status_has_no_trigger() {
        let set = TriggerSet::new(0);
        assert!(set.for_status(PartStatus::Pending).is_some());
        assert!(set.for_status(PartStatus::Arrived).is_some());
        assert!(set.for_status(PartStatus::Available).is_some());
        assert!(set.for_status(PartStatus::CallList).is_none());
    }
}
