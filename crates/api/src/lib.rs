//! HTTP surface for the part-tracking core.
//!
//! Exposes record CRUD-ish operations, lock acquisition/release, and
//! transition history over axum. Actor identity arrives in the
//! `x-actor-id` header; authentication itself is outside this service.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
