//! Record store and lock manager for part records.
//!
//! This crate owns all part state: the records themselves, their
//! append-only transition history, and the exclusive edit locks that
//! gate mutation. Nothing outside this crate and the lifecycle engine
//! mutates records directly.

pub mod locks;
pub mod models;
pub mod records;

pub use locks::LockManager;
pub use records::PartStore;
