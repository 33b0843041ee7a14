//! Record-lock constants and validation.
//!
//! Locks are advisory-exclusive: enforcement happens at the mutation
//! entry points (lifecycle engine and field edits), not at the storage
//! layer. A fixed TTL guarantees an abandoned session can never block a
//! record forever.

// ---------------------------------------------------------------------------
// Lock TTL constants
// ---------------------------------------------------------------------------

/// Default lock TTL in seconds (2 minutes).
pub const DEFAULT_LOCK_TTL_SECS: i64 = 120;

/// Minimum allowed lock TTL in seconds.
pub const MIN_LOCK_TTL_SECS: i64 = 5;

/// Maximum allowed lock TTL in seconds (1 hour).
pub const MAX_LOCK_TTL_SECS: i64 = 3600;

/// Default TTL for the short-lived lock the auto-move scheduler takes
/// while applying a transition.
pub const DEFAULT_SYSTEM_LOCK_TTL_SECS: i64 = 10;

// ---------------------------------------------------------------------------
// Actors
// ---------------------------------------------------------------------------

/// Holder id used by the auto-move scheduler when it acquires a lock.
pub const SYSTEM_ACTOR: &str = "system";

/// Maximum accepted actor id length.
pub const MAX_ACTOR_ID_LEN: usize = 64;

/// Returns `true` if the given holder id is the scheduler.
pub fn is_system_actor(actor_id: &str) -> bool {
    actor_id == SYSTEM_ACTOR
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Validate a lock TTL in seconds. Returns `Ok(())` or an error message.
pub fn validate_lock_ttl(secs: i64) -> Result<(), String> {
    if secs < MIN_LOCK_TTL_SECS {
        return Err(format!(
            "Lock TTL must be at least {MIN_LOCK_TTL_SECS} second(s), got {secs}"
        ));
    }
    if secs > MAX_LOCK_TTL_SECS {
        return Err(format!(
            "Lock TTL must be at most {MAX_LOCK_TTL_SECS} seconds, got {secs}"
        ));
    }
    Ok(())
}

/// Validate an actor id: non-empty, no surrounding whitespace, bounded
/// length.
pub fn validate_actor_id(actor_id: &str) -> Result<(), String> {
    if actor_id.is_empty() {
        return Err("Actor id must not be empty".into());
    }
    if actor_id.trim() != actor_id {
        return Err(format!(
            "Actor id must not have leading/trailing whitespace: '{actor_id}'"
        ));
    }
    if actor_id.len() > MAX_ACTOR_ID_LEN {
        return Err(format!(
            "Actor id must be at most {MAX_ACTOR_ID_LEN} characters, got {}",
            actor_id.len()
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
