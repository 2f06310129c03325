//! Structured export/import of the full store state.
//!
//! A snapshot is the whole task collection plus the active sort key and filter.
//! Loading is defensive: records written by older or hand-edited files are
//! re-validated and re-deduplicated before they reach the store.

use crate::query::Filter;
use crate::store::{Store, StoreError};
use crate::types::{SortKey, Task, normalize_labels, normalize_optional};
use eyre::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Serializable record of a store's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub tasks: Vec<Task>,

    #[serde(default)]
    pub sort_key: SortKey,

    #[serde(default)]
    pub filter: Filter,
}

impl Snapshot {
    /// Read a JSON snapshot from disk.
    pub fn read_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse snapshot {}", path.display()))
    }

    /// Write the snapshot as pretty JSON, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create snapshot directory")?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize snapshot")?;
        fs::write(path, json).with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        info!("Wrote {} tasks to {}", self.tasks.len(), path.display());
        Ok(())
    }
}

impl Store {
    /// Export the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            tasks: self.tasks.clone(),
            sort_key: self.sort_key,
            filter: self.filter.clone(),
        }
    }

    /// Rebuild a store from a snapshot, dropping records that would break
    /// the store's invariants.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Store> {
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(eyre::eyre!(StoreError::UnsupportedSnapshot {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            }));
        }

        let mut store = Store::with_sort_key(snapshot.sort_key);
        let total = snapshot.tasks.len();

        for task in snapshot.tasks {
            if task.id.is_empty() || store.issued.contains(&task.id) {
                warn!("Dropping task with duplicate or empty id: {:?}", task.id);
                continue;
            }
            let Some(task) = sanitize(task) else {
                continue;
            };
            store.issued.insert(task.id.clone());
            store.tasks.push(task);
        }

        store.filter = snapshot.filter.normalized();

        info!("Restored {} of {} tasks from snapshot", store.tasks.len(), total);
        Ok(store)
    }
}

fn sanitize(mut task: Task) -> Option<Task> {
    let title = task.title.trim();
    if title.is_empty() {
        warn!("Dropping task {} with empty title", task.id);
        return None;
    }
    task.title = title.to_string();
    task.category = normalize_optional(task.category.as_deref());
    task.tags = normalize_labels(&task.tags);

    let mut seen = HashSet::new();
    task.dependencies.retain(|d| !d.is_empty() && seen.insert(d.clone()));

    let mut seen = HashSet::new();
    task.subtasks.retain(|s| {
        if s.title.trim().is_empty() || !seen.insert(s.id.clone()) {
            warn!("Dropping subtask {:?} of task {}", s.id, task.id);
            return false;
        }
        true
    });
    Some(task)
}
