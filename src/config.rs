//! Tree configuration
//!
//! [`TreeConfig`] collects the tunables of a [`RedBlackTree`](crate::tree::RedBlackTree):
//! whether snapshots are captured at all, and an optional cap on the memory
//! the pending snapshot queue may hold before captures are skipped.
//!
//! Values can come from [`Default`], from environment variables
//! ([`TreeConfig::from_env`]) or from any serde-compatible source.

use crate::tree::constants::{
    DEFAULT_SNAPSHOT_MEMORY_LIMIT, ENV_RECORD_SNAPSHOTS, ENV_SNAPSHOT_MEMORY_LIMIT,
};
use serde::{Deserialize, Serialize};

/// Tunables for one tree instance
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Capture a snapshot at every elementary step.
    /// Env: RBTRACE_RECORD = 0|1|true|false (default true)
    pub record_snapshots: bool,

    /// Upper bound, in estimated bytes, for snapshots waiting to be drained.
    /// Env: RBTRACE_SNAPSHOT_LIMIT (default unbounded)
    pub snapshot_memory_limit: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            record_snapshots: true,
            snapshot_memory_limit: DEFAULT_SNAPSHOT_MEMORY_LIMIT,
        }
    }
}

impl TreeConfig {
    /// Start from defaults and apply any recognised environment overrides.
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var(ENV_RECORD_SNAPSHOTS) {
            if let Some(flag) = parse_flag(&v) {
                cfg.record_snapshots = flag;
            }
        }

        if let Ok(v) = std::env::var(ENV_SNAPSHOT_MEMORY_LIMIT) {
            if let Ok(n) = v.trim().parse::<usize>() {
                cfg.snapshot_memory_limit = n;
            }
        }

        cfg
    }

    pub fn with_recording(mut self, record: bool) -> Self {
        self.record_snapshots = record;
        self
    }

    pub fn with_snapshot_memory_limit(mut self, bytes: usize) -> Self {
        self.snapshot_memory_limit = bytes;
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
