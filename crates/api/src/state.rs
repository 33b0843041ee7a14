use std::sync::Arc;

use parttrack_engine::LifecycleEngine;
use parttrack_events::EventBus;
use parttrack_store::{LockManager, PartStore};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// The shared record store.
    pub store: Arc<PartStore>,
    /// Exclusive edit-lock arbitration.
    pub locks: Arc<LockManager>,
    /// The single mutation entry point for records.
    pub engine: Arc<LifecycleEngine>,
    /// Event bus for lock-state and transition notifications.
    pub event_bus: Arc<EventBus>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
