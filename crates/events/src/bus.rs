//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`TrackerEvent`]s. It is
//! shared via `Arc<EventBus>` across the lock manager, lifecycle engine,
//! and scheduler; publishing never blocks and never fails.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use parttrack_core::types::DbId;

// ---------------------------------------------------------------------------
// Event type names
// ---------------------------------------------------------------------------

/// Well-known event type strings published by the core.
pub mod event_types {
    /// A lock was granted (fresh acquisition or renewal).
    pub const LOCK_ACQUIRED: &str = "lock.acquired";
    /// A lock was released by its holder.
    pub const LOCK_RELEASED: &str = "lock.released";
    /// An expired lock was evicted.
    pub const LOCK_EXPIRED: &str = "lock.expired";
    /// A part committed a lifecycle transition.
    pub const PART_TRANSITIONED: &str = "part.transitioned";
}

// ---------------------------------------------------------------------------
// TrackerEvent
// ---------------------------------------------------------------------------

/// A state-change event on a part record.
///
/// Constructed via [`TrackerEvent::new`] and enriched with the builder
/// methods [`with_record`](TrackerEvent::with_record),
/// [`with_actor`](TrackerEvent::with_actor), and
/// [`with_payload`](TrackerEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerEvent {
    /// Dot-separated event name, e.g. `"lock.acquired"`.
    pub event_type: String,

    /// The part record the event concerns, if any.
    pub record_id: Option<DbId>,

    /// Id of the actor that caused the event (`"system"` for the
    /// scheduler), if any.
    pub actor_id: Option<String>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl TrackerEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            record_id: None,
            actor_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the subject record to the event.
    pub fn with_record(mut self, record_id: DbId) -> Self {
        self.record_id = Some(record_id);
        self
    }

    /// Attach the acting user or system actor to the event.
    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`TrackerEvent`].
pub struct EventBus {
    sender: broadcast::Sender<TrackerEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed messages are
    /// dropped and slow receivers observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: TrackerEvent) {
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
