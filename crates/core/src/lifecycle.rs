//! Part lifecycle state machine.
//!
//! A part moves strictly forward through `Pending -> Arrived -> Available
//! -> CallList`: no skipping, no backward transitions, no self
//! transitions. Each status maps one-to-one onto a visual indicator
//! string consumed by grid and badge collaborators; the indicator is
//! derived, never set independently.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Visual indicators
// ---------------------------------------------------------------------------

/// Well-known visual indicator strings, one per status.
///
/// These must match the values the frontend grid renderers key on.
pub mod indicators {
    pub const PENDING: &str = "pending-icon";
    pub const ARRIVED: &str = "arrived-icon";
    pub const AVAILABLE: &str = "available-icon";
    pub const CALLLIST: &str = "calllist-icon";
}

// ---------------------------------------------------------------------------
// PartStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a part record.
///
/// The derive order defines the lifecycle order: `Ord` on this enum is
/// the transition ordering, which lets callers compare progress with
/// `<` / `>=` directly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum PartStatus {
    /// Created, waiting on physical arrival.
    Pending,
    /// Physically arrived, waiting on the rest of its group.
    Arrived,
    /// Whole group arrived; ready for pickup.
    Available,
    /// Available but not actioned within the waiting window.
    CallList,
}

impl PartStatus {
    /// The unique next status in the lifecycle, or `None` for the
    /// terminal `CallList` status.
    pub fn successor(self) -> Option<PartStatus> {
        match self {
            PartStatus::Pending => Some(PartStatus::Arrived),
            PartStatus::Arrived => Some(PartStatus::Available),
            PartStatus::Available => Some(PartStatus::CallList),
            PartStatus::CallList => None,
        }
    }

    /// The visual indicator derived from this status.
    pub fn visual_indicator(self) -> &'static str {
        match self {
            PartStatus::Pending => indicators::PENDING,
            PartStatus::Arrived => indicators::ARRIVED,
            PartStatus::Available => indicators::AVAILABLE,
            PartStatus::CallList => indicators::CALLLIST,
        }
    }

    /// Returns `true` if `to` is a legal transition target from `self`.
    pub fn can_transition_to(self, to: PartStatus) -> bool {
        self.successor() == Some(to)
    }
}

impl fmt::Display for PartStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PartStatus::Pending => "Pending",
            PartStatus::Arrived => "Arrived",
            PartStatus::Available => "Available",
            PartStatus::CallList => "CallList",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// TransitionTrigger
// ---------------------------------------------------------------------------

/// Who (or what) initiated a transition.
///
/// Serialized with a `"kind"` discriminator so history consumers can
/// route on `"user"` vs `"auto-move"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TransitionTrigger {
    /// A human actor holding the record's lock.
    #[serde(rename = "user")]
    User { actor_id: String },

    /// The auto-move scheduler, acting on a trigger condition.
    #[serde(rename = "auto-move")]
    AutoMove,
}

impl TransitionTrigger {
    /// The discriminator string used in history payloads and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TransitionTrigger::User { .. } => "user",
            TransitionTrigger::AutoMove => "auto-move",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
