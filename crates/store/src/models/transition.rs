//! Append-only transition history entry.

use serde::Serialize;

use parttrack_core::lifecycle::{PartStatus, TransitionTrigger};
use parttrack_core::types::{DbId, Timestamp};

/// A committed status change. History entries are immutable once
/// written: never edited or deleted, only appended.
#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    pub record_id: DbId,
    pub from_status: PartStatus,
    pub to_status: PartStatus,
    pub triggered_by: TransitionTrigger,
    pub timestamp: Timestamp,
}
