// Constants for the tree engine

/// Default snapshot queue budget: unbounded, so every step is kept
pub const DEFAULT_SNAPSHOT_MEMORY_LIMIT: usize = usize::MAX;

/// Environment variable that toggles snapshot capture
pub const ENV_RECORD_SNAPSHOTS: &str = "RBTRACE_RECORD";

/// Environment variable holding the snapshot queue budget in bytes
pub const ENV_SNAPSHOT_MEMORY_LIMIT: &str = "RBTRACE_SNAPSHOT_LIMIT";
