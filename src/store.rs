//! The task store: canonical collection, mutations and the derived view.

use crate::id::{SUBTASK_PREFIX, TASK_PREFIX, generate_id};
use crate::query::{Filter, compute_view};
use crate::types::{
    NewTask, Progress, SortKey, Subtask, Task, ValidationError, normalize_labels, normalize_optional, push_unique,
};
use chrono::Utc;
use eyre::Result;
use log::debug;
use std::collections::HashSet;

/// Errors that can occur during store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Caller input failed validation.
    InvalidInput(ValidationError),
    /// Snapshot was written by a newer schema.
    UnsupportedSnapshot { found: u32, supported: u32 },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::InvalidInput(e) => write!(f, "invalid input: {}", e),
            StoreError::UnsupportedSnapshot { found, supported } => {
                write!(f, "snapshot version {} is newer than supported version {}", found, supported)
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<ValidationError> for StoreError {
    fn from(e: ValidationError) -> Self {
        StoreError::InvalidInput(e)
    }
}

fn invalid(e: ValidationError) -> eyre::Report {
    eyre::eyre!(StoreError::InvalidInput(e))
}

/// In-memory task store.
///
/// Owns the canonical task sequence (creation order) plus the active sort key,
/// filter and search text. Reads hand out shared references or clones only.
#[derive(Debug, Clone, Default)]
pub struct Store {
    pub(crate) tasks: Vec<Task>,
    pub(crate) sort_key: SortKey,
    pub(crate) filter: Filter,
    pub(crate) search: String,
    /// Every task id ever issued, so deleted ids are never handed out again
    pub(crate) issued: HashSet<String>,
    pub(crate) version: u64,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with the given initial sort key.
    pub fn with_sort_key(sort_key: SortKey) -> Self {
        Self {
            sort_key,
            ..Self::default()
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Canonical sequence, creation order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Resolve a full id or an unambiguous id prefix.
    pub fn resolve(&self, id_or_prefix: &str) -> Option<&Task> {
        if let Some(task) = self.get(id_or_prefix) {
            return Some(task);
        }
        if id_or_prefix.is_empty() {
            return None;
        }
        let mut matches = self.tasks.iter().filter(|t| t.id.starts_with(id_or_prefix));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Some(task),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Bumped on every state change. No-op operations leave it alone.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The derived view under the active filter, search and sort key.
    pub fn view(&self) -> Vec<&Task> {
        compute_view(&self.tasks, self.sort_key, &self.filter, &self.search)
    }

    /// Completion counts over the whole collection.
    pub fn progress(&self) -> Progress {
        Progress {
            completed: self.tasks.iter().filter(|t| t.completed).count(),
            total: self.tasks.len(),
        }
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let mut categories = Vec::new();
        for category in self.tasks.iter().filter_map(|t| t.category.as_deref()) {
            push_unique(&mut categories, category);
        }
        categories
    }

    // ========================================================================
    // Task mutations
    // ========================================================================

    /// Create a new task and append it to the collection.
    pub fn add_task(&mut self, draft: NewTask) -> Result<Task> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(invalid(ValidationError::EmptyTitle));
        }

        let now = Utc::now();
        let mut id = generate_id(TASK_PREFIX, title, now);
        while self.issued.contains(&id) {
            id = generate_id(TASK_PREFIX, title, now);
        }

        let task = Task {
            id,
            title: title.to_string(),
            completed: false,
            created_at: now,
            priority: draft.priority,
            due_date: draft.due_date,
            category: normalize_optional(draft.category.as_deref()),
            notes: draft.notes.filter(|n| !n.is_empty()),
            tags: normalize_labels(&draft.tags),
            subtasks: Vec::new(),
            dependencies: Vec::new(),
        };

        debug!("add_task: id={} priority={}", task.id, task.priority);
        self.issued.insert(task.id.clone());
        self.tasks.push(task.clone());
        self.touch();
        Ok(task)
    }

    /// Flip a task's completion flag. Returns false if the task does not exist.
    pub fn toggle_task(&mut self, id: &str) -> bool {
        let Some(task) = self.task_mut(id) else {
            return false;
        };
        task.completed = !task.completed;
        debug!("toggle_task: id={} completed={}", id, task.completed);
        self.touch();
        true
    }

    /// Remove a task and its subtasks. Dependency references held by other
    /// tasks are left in place.
    pub fn delete_task(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        let removed = self.tasks.remove(index);
        debug!("delete_task: id={} subtasks={}", id, removed.subtasks.len());
        self.touch();
        Some(removed)
    }

    /// Replace notes wholesale. An empty string clears them.
    pub fn update_notes(&mut self, task_id: &str, notes: &str) -> bool {
        let Some(task) = self.task_mut(task_id) else {
            return false;
        };
        let notes = Some(notes.to_string()).filter(|n| !n.is_empty());
        if task.notes == notes {
            return false;
        }
        task.notes = notes;
        debug!("update_notes: id={}", task_id);
        self.touch();
        true
    }

    // ========================================================================
    // Subtasks
    // ========================================================================

    /// Append a subtask. Returns `Ok(None)` if the parent does not exist.
    pub fn add_subtask(&mut self, task_id: &str, title: &str) -> Result<Option<Subtask>> {
        let title = title.trim();
        if title.is_empty() {
            return Err(invalid(ValidationError::EmptySubtaskTitle));
        }
        let Some(task) = self.task_mut(task_id) else {
            return Ok(None);
        };

        let now = Utc::now();
        let mut id = generate_id(SUBTASK_PREFIX, title, now);
        while task.subtask(&id).is_some() {
            id = generate_id(SUBTASK_PREFIX, title, now);
        }

        let subtask = Subtask {
            id,
            title: title.to_string(),
            completed: false,
        };
        task.subtasks.push(subtask.clone());
        debug!("add_subtask: task={} subtask={}", task_id, subtask.id);
        self.touch();
        Ok(Some(subtask))
    }

    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) -> bool {
        let Some(subtask) = self
            .task_mut(task_id)
            .and_then(|t| t.subtasks.iter_mut().find(|s| s.id == subtask_id))
        else {
            return false;
        };
        subtask.completed = !subtask.completed;
        debug!("toggle_subtask: task={} subtask={}", task_id, subtask_id);
        self.touch();
        true
    }

    pub fn delete_subtask(&mut self, task_id: &str, subtask_id: &str) -> Option<Subtask> {
        let task = self.task_mut(task_id)?;
        let index = task.subtasks.iter().position(|s| s.id == subtask_id)?;
        let removed = task.subtasks.remove(index);
        debug!("delete_subtask: task={} subtask={}", task_id, subtask_id);
        self.touch();
        Some(removed)
    }

    // ========================================================================
    // Tags and dependencies
    // ========================================================================

    /// Add a tag with set semantics. Blank tags are ignored.
    pub fn add_tag(&mut self, task_id: &str, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }
        let added = self.task_mut(task_id).is_some_and(|t| push_unique(&mut t.tags, tag));
        if added {
            debug!("add_tag: task={} tag={}", task_id, tag);
            self.touch();
        }
        added
    }

    pub fn remove_tag(&mut self, task_id: &str, tag: &str) -> bool {
        let tag = tag.trim();
        let removed = self.task_mut(task_id).is_some_and(|t| remove_value(&mut t.tags, tag));
        if removed {
            debug!("remove_tag: task={} tag={}", task_id, tag);
            self.touch();
        }
        removed
    }

    /// Record that `task_id` depends on `dependency_id`.
    ///
    /// The dependency is not required to exist and cycles are not checked.
    pub fn add_dependency(&mut self, task_id: &str, dependency_id: &str) -> bool {
        let added = self
            .task_mut(task_id)
            .is_some_and(|t| push_unique(&mut t.dependencies, dependency_id));
        if added {
            debug!("add_dependency: task={} depends_on={}", task_id, dependency_id);
            self.touch();
        }
        added
    }

    pub fn remove_dependency(&mut self, task_id: &str, dependency_id: &str) -> bool {
        let removed = self
            .task_mut(task_id)
            .is_some_and(|t| remove_value(&mut t.dependencies, dependency_id));
        if removed {
            debug!("remove_dependency: task={} depends_on={}", task_id, dependency_id);
            self.touch();
        }
        removed
    }

    // ========================================================================
    // View settings
    // ========================================================================

    pub fn set_sort_key(&mut self, sort_key: SortKey) {
        if self.sort_key != sort_key {
            self.sort_key = sort_key;
            self.touch();
        }
    }

    /// Parse and apply a textual sort key.
    pub fn set_sort_key_str(&mut self, sort_key: &str) -> Result<SortKey> {
        let key: SortKey = sort_key.parse().map_err(invalid)?;
        self.set_sort_key(key);
        Ok(key)
    }

    /// Replace the active filter wholesale. Category and tags are trimmed.
    pub fn set_filter(&mut self, filter: Filter) {
        let filter = filter.normalized();
        if self.filter != filter {
            debug!("set_filter: {:?}", filter);
            self.filter = filter;
            self.touch();
        }
    }

    pub fn clear_filter(&mut self) {
        self.set_filter(Filter::new());
    }

    /// Set the free-text search. An empty string disables it.
    pub fn set_search(&mut self, query: &str) {
        if self.search != query {
            self.search = query.to_string();
            self.touch();
        }
    }

    fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    fn touch(&mut self) {
        self.version += 1;
    }
}

fn remove_value(list: &mut Vec<String>, value: &str) -> bool {
    let before = list.len();
    list.retain(|v| v != value);
    list.len() != before
}
