//! Shared test infrastructure for tasklist integration tests.
//!
//! Provides TestEnv helper for consistent test setup.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use tasklist::{NewTask, Priority, Store, Task};

/// Test environment wrapping a fresh store.
pub struct TestEnv {
    pub store: Store,
}

impl TestEnv {
    /// Create a new test environment with an empty store.
    pub fn new() -> Self {
        Self { store: Store::new() }
    }

    /// Add a task with default priority and nothing else.
    pub fn add(&mut self, title: &str) -> Task {
        self.store.add_task(NewTask::new(title)).expect("Failed to add task")
    }

    /// Add a task with specified priority.
    pub fn add_with_priority(&mut self, title: &str, priority: Priority) -> Task {
        self.store
            .add_task(NewTask::new(title).with_priority(priority))
            .expect("Failed to add task")
    }

    /// Add a task with priority and category.
    pub fn add_in_category(&mut self, title: &str, priority: Priority, category: &str) -> Task {
        self.store
            .add_task(NewTask::new(title).with_priority(priority).with_category(category))
            .expect("Failed to add task")
    }

    /// Add a task with tags.
    pub fn add_with_tags(&mut self, title: &str, tags: &[&str]) -> Task {
        self.store
            .add_task(NewTask::new(title).with_tags(tags.iter().copied()))
            .expect("Failed to add task")
    }

    /// Add a task due `days` after a fixed reference date.
    pub fn add_due(&mut self, title: &str, days: i64) -> Task {
        self.store
            .add_task(NewTask::new(title).with_due_date(reference_date() + Duration::days(days)))
            .expect("Failed to add task")
    }

    /// Titles of the current view, in view order.
    pub fn view_titles(&self) -> Vec<String> {
        self.store.view().iter().map(|t| t.title.clone()).collect()
    }

    /// Assert that a task is in the current view.
    pub fn assert_in_view(&self, task: &Task) {
        let view = self.store.view();
        assert!(
            view.iter().any(|t| t.id == task.id),
            "Expected task {} to be in view, but it wasn't. View: {:?}",
            task.title,
            self.view_titles()
        );
    }

    /// Assert that a task is NOT in the current view.
    pub fn assert_not_in_view(&self, task: &Task) {
        let view = self.store.view();
        assert!(
            !view.iter().any(|t| t.id == task.id),
            "Expected task {} to NOT be in view, but it was",
            task.title
        );
    }

    /// Fetch a task that must exist.
    pub fn task(&self, id: &str) -> &Task {
        self.store.get(id).expect("Task should exist")
    }

    pub fn total_count(&self) -> usize {
        self.store.len()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed date used for due dates and snapshot timestamps.
pub fn reference_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}
