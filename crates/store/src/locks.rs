//! Exclusive edit-lock arbitration for part records.
//!
//! The lock manager's sole job is arbitration: at most one valid lock
//! per record at any instant. Enforcement happens at the mutation entry
//! points (lifecycle engine, field edits), which check with the manager
//! before writing.
//!
//! Expired locks are evicted lazily -- the next `acquire`/`status` call
//! that observes one treats it as absent. [`LockManager::cleanup_expired`]
//! exists for housekeeping only, not correctness.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use parttrack_core::error::CoreError;
use parttrack_core::locking::{validate_actor_id, validate_lock_ttl};
use parttrack_core::types::DbId;
use parttrack_events::bus::event_types;
use parttrack_events::{EventBus, TrackerEvent};

use crate::models::{Lock, LockInfo};

/// Grants, renews, and releases exclusive edit locks per record.
pub struct LockManager {
    locks: Mutex<HashMap<DbId, Lock>>,
    bus: std::sync::Arc<EventBus>,
}

impl LockManager {
    pub fn new(bus: std::sync::Arc<EventBus>) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            bus,
        }
    }

    /// Attempt to acquire an exclusive lock on a record.
    ///
    /// Non-blocking: returns the granted [`Lock`] or
    /// `CoreError::LockConflict` immediately. Re-entrant -- if the caller
    /// already holds the valid lock, its expiry is extended (renewal)
    /// and the same token is kept.
    pub async fn acquire(
        &self,
        record_id: DbId,
        holder_id: &str,
        ttl_secs: i64,
    ) -> Result<Lock, CoreError> {
        validate_actor_id(holder_id).map_err(CoreError::Validation)?;
        validate_lock_ttl(ttl_secs).map_err(CoreError::Validation)?;

        let now = Utc::now();
        let mut locks = self.locks.lock().await;

        if let Some(existing) = locks.get_mut(&record_id) {
            if existing.is_valid_at(now) {
                if existing.holder_id == holder_id {
                    // Renewal: extend expiry, keep the token.
                    existing.expires_at = now + Duration::seconds(ttl_secs);
                    let renewed = existing.clone();
                    drop(locks);
                    tracing::debug!(
                        record_id,
                        holder = %holder_id,
                        expires_at = %renewed.expires_at,
                        "Lock renewed"
                    );
                    self.emit_acquired(&renewed, true);
                    return Ok(renewed);
                }
                return Err(CoreError::LockConflict {
                    record_id,
                    held_by: existing.holder_id.clone(),
                    expires_at: existing.expires_at,
                });
            }
            // Expired lock: evict, then grant below.
            let evicted = locks.remove(&record_id);
            if let Some(evicted) = evicted {
                self.emit_expired(&evicted);
            }
        }

        let lock = Lock {
            record_id,
            holder_id: holder_id.to_string(),
            token: Uuid::new_v4().to_string(),
            acquired_at: now,
            expires_at: now + Duration::seconds(ttl_secs),
        };
        locks.insert(record_id, lock.clone());
        drop(locks);

        tracing::info!(
            record_id,
            holder = %holder_id,
            expires_at = %lock.expires_at,
            "Lock acquired"
        );
        self.emit_acquired(&lock, false);
        Ok(lock)
    }

    /// Release a lock. Only the holder can release; releasing an
    /// unlocked (or expired) record is an idempotent no-op returning
    /// `Ok(false)`.
    pub async fn release(&self, record_id: DbId, holder_id: &str) -> Result<bool, CoreError> {
        let now = Utc::now();
        let mut locks = self.locks.lock().await;

        let Some(existing) = locks.get(&record_id) else {
            return Ok(false);
        };

        if !existing.is_valid_at(now) {
            let evicted = locks.remove(&record_id);
            drop(locks);
            if let Some(evicted) = evicted {
                self.emit_expired(&evicted);
            }
            return Ok(false);
        }

        if existing.holder_id != holder_id {
            return Err(CoreError::NotOwner { record_id });
        }

        let released = locks.remove(&record_id);
        drop(locks);
        if let Some(released) = released {
            tracing::info!(record_id, holder = %holder_id, "Lock released");
            self.bus.publish(
                TrackerEvent::new(event_types::LOCK_RELEASED)
                    .with_record(record_id)
                    .with_actor(released.holder_id.clone()),
            );
        }
        Ok(true)
    }

    /// Read-only lock check. An expired lock is treated as absent and
    /// evicted on observation.
    pub async fn status(&self, record_id: DbId) -> Option<LockInfo> {
        let now = Utc::now();
        let mut locks = self.locks.lock().await;

        match locks.get(&record_id) {
            Some(lock) if lock.is_valid_at(now) => Some(LockInfo::from(lock)),
            Some(_) => {
                let evicted = locks.remove(&record_id);
                drop(locks);
                if let Some(evicted) = evicted {
                    self.emit_expired(&evicted);
                }
                None
            }
            None => None,
        }
    }

    /// Returns `true` if `holder_id` currently holds a valid lock on the
    /// record.
    pub async fn holds_valid_lock(&self, record_id: DbId, holder_id: &str) -> bool {
        matches!(
            self.status(record_id).await,
            Some(info) if info.holder_id == holder_id
        )
    }

    /// Housekeeping sweep: evict every expired lock. Returns the number
    /// evicted.
    pub async fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let mut locks = self.locks.lock().await;
        let expired: Vec<DbId> = locks
            .iter()
            .filter(|(_, lock)| !lock.is_valid_at(now))
            .map(|(id, _)| *id)
            .collect();

        let mut evicted = Vec::with_capacity(expired.len());
        for id in expired {
            if let Some(lock) = locks.remove(&id) {
                evicted.push(lock);
            }
        }
        drop(locks);

        for lock in &evicted {
            self.emit_expired(lock);
        }
        if !evicted.is_empty() {
            tracing::debug!(count = evicted.len(), "Evicted expired locks");
        }
        evicted.len()
    }

    fn emit_acquired(&self, lock: &Lock, renewal: bool) {
        self.bus.publish(
            TrackerEvent::new(event_types::LOCK_ACQUIRED)
                .with_record(lock.record_id)
                .with_actor(lock.holder_id.clone())
                .with_payload(serde_json::json!({
                    "expires_at": lock.expires_at,
                    "renewal": renewal,
                })),
        );
    }

    fn emit_expired(&self, lock: &Lock) {
        tracing::debug!(
            record_id = lock.record_id,
            holder = %lock.holder_id,
            "Evicted expired lock"
        );
        self.bus.publish(
            TrackerEvent::new(event_types::LOCK_EXPIRED)
                .with_record(lock.record_id)
                .with_actor(lock.holder_id.clone()),
        );
    }

    /// Rewind a lock's expiry into the past, simulating TTL expiry.
    #[cfg(test)]
    async fn force_expire(&self, record_id: DbId) {
        let mut locks = self.locks.lock().await;
        if let Some(lock) = locks.get_mut(&record_id) {
            lock.expires_at = Utc::now() - Duration::seconds(1);
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
    use std::sync::Arc;

    fn manager() -> (Arc<LockManager>, Arc<EventBus>) {
        let bus = Arc::new(EventBus::default());
        (Arc::new(LockManager::new(Arc::clone(&bus))), bus)
    }

    // -----------------------------------------------------------------------
    // Acquisition and conflicts
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn acquire_grants_lock_with_token_and_expiry() {
        let (locks, _bus) = manager();
        let lock = locks.acquire(1, "user:a", 60).await.unwrap();

        assert_eq!(lock.record_id, 1);
        assert_eq!(lock.holder_id, "user:a");
        assert!(!lock.token.is_empty());
        assert!(lock.expires_at > lock.acquired_at);
    }

    #[tokio::test]
    async fn second_actor_gets_conflict_with_existing_expiry() {
        let (locks, _bus) = manager();
        let lock = locks.acquire(1, "user:a", 60).await.unwrap();

        let result = locks.acquire(1, "user:b", 60).await;
        assert_matches!(
            result,
            Err(CoreError::LockConflict { record_id: 1, ref held_by, expires_at })
                if held_by == "user:a" && expires_at == lock.expires_at
        );
    }

    #[tokio::test]
    async fn reacquire_by_holder_renews_and_keeps_token() {
        let (locks, _bus) = manager();
        let first = locks.acquire(1, "user:a", 60).await.unwrap();
        let renewed = locks.acquire(1, "user:a", 600).await.unwrap();

        assert_eq!(renewed.token, first.token);
        assert!(renewed.expires_at > first.expires_at);
    }

    #[tokio::test]
    async fn locks_on_different_records_are_independent() {
        let (locks, _bus) = manager();
        locks.acquire(1, "user:a", 60).await.unwrap();
        assert!(locks.acquire(2, "user:b", 60).await.is_ok());
    }

    #[tokio::test]
    async fn invalid_ttl_and_actor_are_rejected() {
        let (locks, _bus) = manager();
        assert_matches!(
            locks.acquire(1, "user:a", 0).await,
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            locks.acquire(1, "", 60).await,
            Err(CoreError::Validation(_))
        );
    }

    // -----------------------------------------------------------------------
    // Mutual exclusion under concurrency
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn concurrent_acquires_yield_exactly_one_winner() {
        let (locks, _bus) = manager();

        let mut handles = Vec::new();
        for i in 0..16 {
            let locks = Arc::clone(&locks);
            handles.push(tokio::spawn(async move {
                locks.acquire(1, &format!("user:{i}"), 60).await
            }));
        }

        let mut successes = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(CoreError::LockConflict { .. }) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(conflicts, 15);
    }

    // -----------------------------------------------------------------------
    // Release
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn release_by_holder_frees_the_record() {
        let (locks, _bus) = manager();
        locks.acquire(1, "user:a", 60).await.unwrap();

        assert!(locks.release(1, "user:a").await.unwrap());
        assert!(locks.status(1).await.is_none());
        // Another actor can now acquire.
        assert!(locks.acquire(1, "user:b", 60).await.is_ok());
    }

    #[tokio::test]
    async fn release_by_non_holder_fails_with_not_owner() {
        let (locks, _bus) = manager();
        locks.acquire(1, "user:a", 60).await.unwrap();

        assert_matches!(
            locks.release(1, "user:b").await,
            Err(CoreError::NotOwner { record_id: 1 })
        );
        // The lock is still held.
        assert!(locks.holds_valid_lock(1, "user:a").await);
    }

    #[tokio::test]
    async fn release_of_unlocked_record_is_idempotent() {
        let (locks, _bus) = manager();
        assert!(!locks.release(1, "user:a").await.unwrap());
    }

    // -----------------------------------------------------------------------
    // Expiry eviction
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn expired_lock_is_absent_on_next_observation() {
        let (locks, _bus) = manager();
        locks.acquire(1, "user:a", 60).await.unwrap();
        locks.force_expire(1).await;

        assert!(locks.status(1).await.is_none());
        assert!(!locks.holds_valid_lock(1, "user:a").await);
    }

    #[tokio::test]
    async fn acquire_evicts_expired_lock_of_another_actor() {
        let (locks, bus) = manager();
        let mut rx = bus.subscribe();

        locks.acquire(1, "user:a", 60).await.unwrap();
        locks.force_expire(1).await;

        // User B acquires without user A ever releasing.
        let lock = locks.acquire(1, "user:b", 60).await.unwrap();
        assert_eq!(lock.holder_id, "user:b");

        // Event order: a's acquisition, a's eviction, b's acquisition.
        assert_eq!(rx.recv().await.unwrap().event_type, "lock.acquired");
        let expired = rx.recv().await.unwrap();
        assert_eq!(expired.event_type, "lock.expired");
        assert_eq!(expired.actor_id.as_deref(), Some("user:a"));
        assert_eq!(rx.recv().await.unwrap().event_type, "lock.acquired");
    }

    #[tokio::test]
    async fn cleanup_expired_sweeps_only_expired_locks() {
        let (locks, _bus) = manager();
        locks.acquire(1, "user:a", 60).await.unwrap();
        locks.acquire(2, "user:b", 60).await.unwrap();
        locks.force_expire(1).await;

        assert_eq!(locks.cleanup_expired().await, 1);
        assert!(locks.status(1).await.is_none());
        assert!(locks.status(2).await.is_some());
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn acquire_and_release_publish_lock_events() {
        let (locks, bus) = manager();
        let mut rx = bus.subscribe();

        locks.acquire(1, "user:a", 60).await.unwrap();
        locks.release(1, "user:a").await.unwrap();

        let acquired = rx.recv().await.unwrap();
        assert_eq!(acquired.event_type, "lock.acquired");
        assert_eq!(acquired.record_id, Some(1));
        assert_eq!(acquired.payload["renewal"], false);

        let released = rx.recv().await.unwrap();
        assert_eq!(released.event_type, "lock.released");
        assert_eq!(released.actor_id.as_deref(), Some("user:a"));
    }

    #[tokio::test]
    async fn status_omits_the_holder_token() {
        let (locks, _bus) = manager();
        locks.acquire(1, "user:a", 60).await.unwrap();

        let info = locks.status(1).await.unwrap();
        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("token").is_none());
        assert_eq!(json["holder_id"], "user:a");
    }
}
