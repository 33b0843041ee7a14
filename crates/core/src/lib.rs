//! Domain layer for parttrack: part lifecycle state machine, lock
//! constants and validation, and the shared error taxonomy.
//!
//! This crate has zero internal dependencies so that the store, engine,
//! scheduler, and API crates can all reference the same status ordering,
//! lock durations, and error variants.

pub mod error;
pub mod lifecycle;
pub mod locking;
pub mod types;
