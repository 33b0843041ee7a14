//! Exclusive record-lock model.

use serde::Serialize;

use parttrack_core::types::{DbId, Timestamp};

/// An exclusive, time-bounded claim by one actor on one record.
///
/// The `token` is returned only to the acquirer; lock-status reads go
/// through [`LockInfo`], which omits it.
#[derive(Debug, Clone, Serialize)]
pub struct Lock {
    pub record_id: DbId,
    pub holder_id: String,
    pub token: String,
    pub acquired_at: Timestamp,
    pub expires_at: Timestamp,
}

impl Lock {
    /// A lock is valid only while `now < expires_at`. An expired lock is
    /// equivalent to no lock.
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        now < self.expires_at
    }
}

/// Public view of a lock, without the holder's token.
#[derive(Debug, Clone, Serialize)]
pub struct LockInfo {
    pub record_id: DbId,
    pub holder_id: String,
    pub acquired_at: Timestamp,
    pub expires_at: Timestamp,
}

impl From<&Lock> for LockInfo {
    fn from(lock: &Lock) -> Self {
        Self {
            record_id: lock.record_id,
            holder_id: lock.holder_id.clone(),
            acquired_at: lock.acquired_at,
            expires_at: lock.expires_at,
        }
    }
}
