//! Core data types for the task list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A user-visible unit of work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Unique identifier: "td-" + 32 hex chars
    pub id: String,

    /// Short label, never empty
    pub title: String,

    #[serde(default)]
    pub completed: bool,

    /// When created (immutable)
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Free text, replaced wholesale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Unique labels, insertion order kept for display
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<Subtask>,

    /// Ids of tasks this one depends on. May dangle.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

/// A smaller unit of work nested under a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subtask {
    /// Unique within the parent task
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Task priority levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Sort rank: high first.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "l" => Ok(Priority::Low),
            "medium" | "med" | "m" => Ok(Priority::Medium),
            "high" | "h" => Ok(Priority::High),
            _ => Err(ValidationError::UnknownPriority(s.to_string())),
        }
    }
}

/// Ordering applied to the derived view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Newest first
    #[default]
    #[serde(alias = "createdAt")]
    CreatedAt,
    /// High, then medium, then low
    Priority,
    /// Earliest first, undated last
    #[serde(alias = "dueDate")]
    DueDate,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::CreatedAt => "createdAt",
            SortKey::Priority => "priority",
            SortKey::DueDate => "dueDate",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ValidationError;

    /// Accepts camelCase, snake_case and kebab-case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "createdat" | "created" => Ok(SortKey::CreatedAt),
            "priority" => Ok(SortKey::Priority),
            "duedate" | "due" => Ok(SortKey::DueDate),
            _ => Err(ValidationError::UnknownSortKey(s.to_string())),
        }
    }
}

/// Completed/total counter used for progress display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Percentage complete, 0 when there is nothing to complete.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 * 100.0 / self.total as f64
        }
    }
}

/// Everything needed to create a task. The store assigns id and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewTask {
    /// Create a draft with just a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(|t| t.into()).collect();
        self
    }
}

/// Validation errors for caller-supplied input.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyTitle,
    EmptySubtaskTitle,
    UnknownPriority(String),
    UnknownSortKey(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyTitle => write!(f, "title cannot be empty"),
            ValidationError::EmptySubtaskTitle => write!(f, "subtask title cannot be empty"),
            ValidationError::UnknownPriority(p) => {
                write!(f, "unknown priority '{}': expected low, medium or high", p)
            }
            ValidationError::UnknownSortKey(k) => {
                write!(f, "unknown sort key '{}': expected createdAt, priority or dueDate", k)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl Task {
    /// Validate the task's caller-controlled fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.subtasks.iter().any(|s| s.title.trim().is_empty()) {
            return Err(ValidationError::EmptySubtaskTitle);
        }
        Ok(())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn subtask(&self, subtask_id: &str) -> Option<&Subtask> {
        self.subtasks.iter().find(|s| s.id == subtask_id)
    }

    /// Resolve a full subtask id or an unambiguous prefix.
    pub fn resolve_subtask(&self, id_or_prefix: &str) -> Option<&Subtask> {
        resolve_prefix(&self.subtasks, id_or_prefix, |s| s.id.as_str())
    }

    /// Resolve a recorded dependency by full id or unambiguous prefix.
    pub fn resolve_dependency(&self, id_or_prefix: &str) -> Option<&str> {
        resolve_prefix(&self.dependencies, id_or_prefix, |d| d.as_str()).map(String::as_str)
    }

    pub fn subtask_progress(&self) -> Progress {
        Progress {
            completed: self.subtasks.iter().filter(|s| s.completed).count(),
            total: self.subtasks.len(),
        }
    }

    /// Case-insensitive substring match over title, notes and tags.
    /// `needle` must already be lowercase.
    pub(crate) fn matches_search(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(needle)
            || self
                .notes
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(needle))
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

/// Exact match first, then a prefix shared by exactly one item.
fn resolve_prefix<'a, T>(items: &'a [T], id_or_prefix: &str, id: impl Fn(&T) -> &str) -> Option<&'a T> {
    if let Some(item) = items.iter().find(|i| id(i) == id_or_prefix) {
        return Some(item);
    }
    if id_or_prefix.is_empty() {
        return None;
    }
    let mut matches = items.iter().filter(|i| id(i).starts_with(id_or_prefix));
    match (matches.next(), matches.next()) {
        (Some(item), None) => Some(item),
        _ => None,
    }
}

/// Push `value` unless already present. Returns whether it was added.
pub(crate) fn push_unique(list: &mut Vec<String>, value: &str) -> bool {
    if list.iter().any(|v| v == value) {
        return false;
    }
    list.push(value.to_string());
    true
}

/// Trim entries, drop empties and duplicates, keep first occurrence order.
pub(crate) fn normalize_labels(labels: impl IntoIterator<Item = impl AsRef<str>>) -> Vec<String> {
    let mut out = Vec::new();
    for label in labels {
        let label = label.as_ref().trim();
        if !label.is_empty() {
            push_unique(&mut out, label);
        }
    }
    out
}

/// Trim and collapse an empty string to `None`.
pub(crate) fn normalize_optional(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}
