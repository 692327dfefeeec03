use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled value: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_opt<L>(lookup: &L, profile: &str, key: &str) -> Option<String>
where
    L: Fn(&str) -> Option<String>,
{
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = lookup(&prefixed) {
            return Some(v);
        }
    }
    lookup(key)
}

fn profiled_u64<L>(lookup: &L, profile: &str, key: &str, default: u64) -> u64
where
    L: Fn(&str) -> Option<String>,
{
    profiled_opt(lookup, profile, key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

pub const PROFILE_KEY: &str = "ATSCHED_PROFILE";
pub const POLL_INTERVAL_KEY: &str = "ATSCHED_POLL_INTERVAL_MS";
pub const SLOW_TASK_KEY: &str = "ATSCHED_SLOW_TASK_MS";

/// Scheduler settings.
///
/// The scheduler itself never sleeps; `poll_interval_ms` is the cadence a
/// host loop is expected to call `poll()` at, and bounds how late a task may
/// run after its due time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Active profile name (empty = default).
    #[serde(default)]
    pub profile: String,
    /// Suggested polling cadence in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// A single call running longer than this is logged as slow.
    #[serde(default = "default_slow_task")]
    pub slow_task_threshold_ms: u64,
}

fn default_poll_interval() -> u64 { 100 }
fn default_slow_task() -> u64 { 1000 }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            profile: String::new(),
            poll_interval_ms: default_poll_interval(),
            slow_task_threshold_ms: default_slow_task(),
        }
    }
}

impl SchedulerConfig {
    /// Build config from environment variables, loading `.env` first.
    ///
    /// Profile is read from `ATSCHED_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        load_dotenv();
        Self::from_lookup(env_opt)
    }

    /// Build config from an arbitrary key lookup. Unparsable values fall
    /// back to their defaults.
    pub fn from_lookup<L>(lookup: L) -> Self
    where
        L: Fn(&str) -> Option<String>,
    {
        let profile = lookup(PROFILE_KEY).unwrap_or_default().to_uppercase();
        let p = profile.as_str();
        Self {
            poll_interval_ms: profiled_u64(&lookup, p, POLL_INTERVAL_KEY, default_poll_interval()),
            slow_task_threshold_ms: profiled_u64(&lookup, p, SLOW_TASK_KEY, default_slow_task()),
            profile,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn slow_task_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_task_threshold_ms)
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Scheduler config loaded (profile: {}):", self.profile_label());
        tracing::info!("  poll_interval:  {}ms", self.poll_interval_ms);
        tracing::info!("  slow_task:      {}ms", self.slow_task_threshold_ms);
    }
}
