//! Builder pattern API for creating tasks.

use crate::store::Store;
use crate::types::{NewTask, Priority, Task};
use chrono::{DateTime, Utc};
use eyre::Result;

/// Builder for creating tasks with a fluent API.
///
/// # Example
///
/// ```
/// use tasklist::{Priority, Store, StoreBuilderExt};
///
/// let mut store = Store::new();
/// let task = store
///     .build("Book flights")
///     .priority(Priority::High)
///     .category("travel")
///     .tag("urgent")
///     .notes("Window seat")
///     .create()
///     .unwrap();
/// assert_eq!(task.tags, vec!["urgent"]);
/// ```
pub struct TaskBuilder<'a> {
    store: &'a mut Store,
    draft: NewTask,
}

impl<'a> TaskBuilder<'a> {
    /// Create a new builder with the given title.
    pub fn new(store: &'a mut Store, title: impl Into<String>) -> Self {
        Self {
            store,
            draft: NewTask::new(title),
        }
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.draft.priority = priority;
        self
    }

    pub fn due(mut self, due_date: DateTime<Utc>) -> Self {
        self.draft.due_date = Some(due_date);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.draft.category = Some(category.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.draft.notes = Some(notes.into());
        self
    }

    /// Add a tag. Duplicates are dropped on create.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.draft.tags.push(tag.into());
        self
    }

    pub fn tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.draft.tags.extend(tags.into_iter().map(|t| t.into()));
        self
    }

    /// Create the task.
    pub fn create(self) -> Result<Task> {
        self.store.add_task(self.draft)
    }
}

/// Extension trait to add builder method to Store.
pub trait StoreBuilderExt {
    /// Start building a new task with the given title.
    fn build(&mut self, title: impl Into<String>) -> TaskBuilder<'_>;
}

impl StoreBuilderExt for Store {
    fn build(&mut self, title: impl Into<String>) -> TaskBuilder<'_> {
        TaskBuilder::new(self, title)
    }
}
