//! Part record model and mutation DTOs.

use serde::{Deserialize, Serialize};
use validator::Validate;

use parttrack_core::lifecycle::PartStatus;
use parttrack_core::types::{DbId, Timestamp};

/// A tracked part record.
///
/// `visual_indicator` is derived one-to-one from `status` and is never
/// set independently. `version` increments on every committed mutation
/// and serves as the staleness witness for lock-free readers.
#[derive(Debug, Clone, Serialize)]
pub struct PartRecord {
    pub id: DbId,
    pub part_number: String,
    pub description: String,
    /// Booking/VIN-style grouping key. Parts sharing a group become
    /// Available together once every member has Arrived.
    pub group_key: Option<String>,
    /// Set by an editor to mark physical arrival; drives the
    /// Pending -> Arrived auto-move.
    pub arrival_reported: bool,
    pub status: PartStatus,
    pub visual_indicator: &'static str,
    pub version: i64,
    /// When `status` last changed; drives the CallList waiting window.
    pub status_changed_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for creating a part. New parts always start in `Pending`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePartRequest {
    #[validate(length(min = 1, max = 64, message = "part_number is required"))]
    pub part_number: String,

    #[serde(default)]
    #[validate(length(max = 512))]
    pub description: String,

    #[validate(length(min = 1, max = 64))]
    pub group_key: Option<String>,
}

/// Lock-gated field edits. `None` fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePartFields {
    #[validate(length(min = 1, max = 64))]
    pub part_number: Option<String>,

    #[validate(length(max = 512))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 64))]
    pub group_key: Option<String>,

    pub arrival_reported: Option<bool>,
}

impl UpdatePartFields {
    /// Returns `true` if no field edit was requested.
    pub fn is_empty(&self) -> bool {
        self.part_number.is_none()
            && self.description.is_none()
            && self.group_key.is_none()
            && self.arrival_reported.is_none()
    }
}
