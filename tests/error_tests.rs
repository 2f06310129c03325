//! Integration tests for error handling.
//!
//! Invalid input is rejected; operations on unknown ids are silent no-ops.

mod common;

use common::TestEnv;
use tasklist::{NewTask, Priority, SortKey, Store, StoreError, ValidationError};

fn validation_error(err: &eyre::Report) -> Option<&ValidationError> {
    match err.downcast_ref::<StoreError>() {
        Some(StoreError::InvalidInput(e)) => Some(e),
        _ => None,
    }
}

// =============================================================================
// Invalid Input
// =============================================================================

#[test]
fn test_add_empty_title_fails() {
    let mut env = TestEnv::new();

    let err = env.store.add_task(NewTask::new("")).unwrap_err();
    assert_eq!(validation_error(&err), Some(&ValidationError::EmptyTitle));
    assert_eq!(env.total_count(), 0);
}

#[test]
fn test_add_whitespace_only_title_fails() {
    let mut env = TestEnv::new();

    let err = env.store.add_task(NewTask::new(" \t\n ")).unwrap_err();
    assert_eq!(validation_error(&err), Some(&ValidationError::EmptyTitle));
}

#[test]
fn test_add_subtask_empty_title_fails() {
    let mut env = TestEnv::new();
    let task = env.add("Parent");

    let err = env.store.add_subtask(&task.id, "   ").unwrap_err();
    assert_eq!(validation_error(&err), Some(&ValidationError::EmptySubtaskTitle));
    assert!(env.task(&task.id).subtasks.is_empty());
}

#[test]
fn test_add_subtask_empty_title_fails_even_for_missing_parent() {
    let mut env = TestEnv::new();
    assert!(env.store.add_subtask("td-missing", "").is_err());
}

#[test]
fn test_unknown_sort_key_fails() {
    let mut env = TestEnv::new();
    env.store.set_sort_key(SortKey::Priority);

    let err = env.store.set_sort_key_str("title").unwrap_err();
    assert_eq!(
        validation_error(&err),
        Some(&ValidationError::UnknownSortKey("title".to_string()))
    );
    // previous key is kept
    assert_eq!(env.store.sort_key(), SortKey::Priority);
}

#[test]
fn test_unknown_priority_text_fails() {
    let result = "critical".parse::<Priority>();
    assert_eq!(result, Err(ValidationError::UnknownPriority("critical".to_string())));
}

#[test]
fn test_error_message_is_readable() {
    let mut store = Store::new();
    let err = store.add_task(NewTask::new("")).unwrap_err();
    assert_eq!(err.to_string(), "invalid input: title cannot be empty");
}

// =============================================================================
// Silent No-ops
// =============================================================================

#[test]
fn test_toggle_nonexistent_task_is_noop() {
    let mut env = TestEnv::new();
    env.add("Real");
    let version = env.store.version();

    assert!(!env.store.toggle_task("td-nonexistent"));
    assert_eq!(env.store.version(), version);
}

#[test]
fn test_delete_twice_is_safe() {
    let mut env = TestEnv::new();
    let task = env.add("Doomed");

    assert!(env.store.delete_task(&task.id).is_some());
    let version = env.store.version();
    assert!(env.store.delete_task(&task.id).is_none());
    assert_eq!(env.store.version(), version);
    assert_eq!(env.total_count(), 0);
}

#[test]
fn test_delete_subtask_twice_is_safe() {
    let mut env = TestEnv::new();
    let task = env.add("Parent");
    let sub = env.store.add_subtask(&task.id, "Child").unwrap().unwrap();

    assert!(env.store.delete_subtask(&task.id, &sub.id).is_some());
    assert!(env.store.delete_subtask(&task.id, &sub.id).is_none());
    assert!(env.store.delete_subtask("td-missing", &sub.id).is_none());
}

#[test]
fn test_mutations_on_missing_task_are_noops() {
    let mut env = TestEnv::new();
    let task = env.add("Untouched");
    let before = env.task(&task.id).clone();
    let version = env.store.version();

    assert!(env.store.add_subtask("td-missing", "x").unwrap().is_none());
    assert!(!env.store.toggle_subtask("td-missing", "st-x"));
    assert!(!env.store.update_notes("td-missing", "x"));
    assert!(!env.store.add_tag("td-missing", "x"));
    assert!(!env.store.remove_tag("td-missing", "x"));
    assert!(!env.store.add_dependency("td-missing", &task.id));
    assert!(!env.store.remove_dependency("td-missing", &task.id));

    assert_eq!(env.task(&task.id), &before);
    assert_eq!(env.store.version(), version);
}

#[test]
fn test_remove_absent_tag_is_noop() {
    let mut env = TestEnv::new();
    let task = env.add_with_tags("Tagged", &["a"]);

    assert!(!env.store.remove_tag(&task.id, "b"));
    assert_eq!(env.task(&task.id).tags, vec!["a"]);
}
