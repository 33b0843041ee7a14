//! Auto-move scheduler: advances part records through the lifecycle
//! without human action when their trigger conditions hold.
//!
//! The scheduler is just another actor: it acquires the record's lock
//! (as `"system"`, with a short TTL) before requesting a transition, so
//! it can never override a human's in-progress edit. A record whose
//! condition stays true is retried every cycle until the move succeeds
//! or the condition becomes false.

pub mod automove;
pub mod config;
pub mod triggers;

pub use automove::{AutoMoveScheduler, CycleStats};
pub use config::SchedulerConfig;
