use parttrack_core::locking::DEFAULT_SYSTEM_LOCK_TTL_SECS;

/// Auto-move scheduler configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Seconds between evaluation cycles (default: `30`).
    pub interval_secs: u64,
    /// TTL in seconds for the short-lived system lock taken while
    /// applying a transition (default: `10`).
    pub system_lock_ttl_secs: i64,
    /// Waiting window in seconds before an un-actioned `Available` part
    /// moves to `CallList` (default: `86400`, 24 hours).
    pub calllist_wait_secs: i64,
}

impl SchedulerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default |
    /// |-------------------------|---------|
    /// | `AUTOMOVE_INTERVAL_SECS`| `30`    |
    /// | `SYSTEM_LOCK_TTL_SECS`  | `10`    |
    /// | `CALLLIST_WAIT_SECS`    | `86400` |
    pub fn from_env() -> Self {
        let interval_secs: u64 = std::env::var("AUTOMOVE_INTERVAL_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("AUTOMOVE_INTERVAL_SECS must be a valid u64");

        let system_lock_ttl_secs: i64 = std::env::var("SYSTEM_LOCK_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_SYSTEM_LOCK_TTL_SECS.to_string())
            .parse()
            .expect("SYSTEM_LOCK_TTL_SECS must be a valid i64");

        let calllist_wait_secs: i64 = std::env::var("CALLLIST_WAIT_SECS")
            .unwrap_or_else(|_| "86400".into())
            .parse()
            .expect("CALLLIST_WAIT_SECS must be a valid i64");

        Self {
            interval_secs,
            system_lock_ttl_secs,
            calllist_wait_secs,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            system_lock_ttl_secs: DEFAULT_SYSTEM_LOCK_TTL_SECS,
            calllist_wait_secs: 86_400,
        }
    }
}
