//! ID generation for tasks and subtasks.

use chrono::{DateTime, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};

/// Prefix for task ids.
pub const TASK_PREFIX: &str = "td";

/// Prefix for subtask ids.
pub const SUBTASK_PREFIX: &str = "st";

/// Generate an id from content + entropy.
/// Format: prefix + "-" + 32 hex chars (128 bits of SHA256(title + timestamp + random))
pub fn generate_id(prefix: &str, title: &str, created_at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(created_at.timestamp_nanos_opt().unwrap_or(0).to_le_bytes());
    hasher.update(rand::rng().random::<[u8; 16]>());
    let hash = hasher.finalize();
    let hex: String = hash[..16].iter().map(|b| format!("{:02x}", b)).collect();
    format!("{}-{}", prefix, hex)
}
