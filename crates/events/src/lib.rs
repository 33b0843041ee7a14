//! Notification emitter for the part-tracking core.
//!
//! Lock-state changes and committed transitions are published on an
//! in-process [`EventBus`]; delivery to collaborators (UI badges, the
//! call-list view, notification services) is the subscribers' concern.

pub mod bus;

pub use bus::{EventBus, TrackerEvent};
