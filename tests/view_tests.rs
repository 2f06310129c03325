//! Integration tests for the derived view.
//!
//! Tests sort order, filter composition and free-text search.

mod common;

use chrono::Duration;
use common::{TestEnv, reference_date};
use tasklist::{Filter, NewTask, Priority, SortKey, Snapshot, Store, Task};

/// Store whose tasks were created `minutes` after the reference date.
fn store_created_at(entries: &[(&str, i64)]) -> Store {
    let tasks = entries
        .iter()
        .enumerate()
        .map(|(i, (title, minutes))| Task {
            id: format!("td-{:02}", i),
            title: title.to_string(),
            completed: false,
            created_at: reference_date() + Duration::minutes(*minutes),
            priority: Priority::Medium,
            due_date: None,
            category: None,
            notes: None,
            tags: vec![],
            subtasks: vec![],
            dependencies: vec![],
        })
        .collect();
    Store::from_snapshot(Snapshot {
        version: tasklist::SNAPSHOT_VERSION,
        tasks,
        sort_key: SortKey::CreatedAt,
        filter: Filter::new(),
    })
    .unwrap()
}

fn titles(store: &Store) -> Vec<String> {
    store.view().iter().map(|t| t.title.clone()).collect()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_scenario_creation() {
    let mut env = TestEnv::new();
    env.store
        .add_task(NewTask::new("Buy milk").with_priority(Priority::High))
        .unwrap();

    let view = env.store.view();
    assert_eq!(view.len(), 1);
    let task = view[0];
    assert_eq!(task.title, "Buy milk");
    assert!(!task.completed);
    assert_eq!(task.priority, Priority::High);
    assert!(task.subtasks.is_empty());
    assert!(task.tags.is_empty());
    assert!(task.dependencies.is_empty());
}

#[test]
fn test_scenario_toggle_then_filter() {
    let mut env = TestEnv::new();
    let first = env.add("First");
    let second = env.add("Second");

    env.store.toggle_task(&second.id);
    env.store.set_filter(Filter::new().completed(true));

    let view = env.store.view();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].id, second.id);
    env.assert_not_in_view(&first);
}

#[test]
fn test_empty_store_view() {
    let env = TestEnv::new();
    assert!(env.store.view().is_empty());
}

// =============================================================================
// Sorting
// =============================================================================

#[test]
fn test_sort_priority_high_medium_low() {
    let mut env = TestEnv::new();
    env.add_with_priority("low", Priority::Low);
    env.add_with_priority("high", Priority::High);
    env.add_with_priority("medium", Priority::Medium);

    env.store.set_sort_key(SortKey::Priority);
    assert_eq!(env.view_titles(), vec!["high", "medium", "low"]);
}

#[test]
fn test_sort_priority_ties_keep_creation_order() {
    let mut env = TestEnv::new();
    env.add_with_priority("h1", Priority::High);
    env.add_with_priority("l1", Priority::Low);
    env.add_with_priority("h2", Priority::High);
    env.add_with_priority("l2", Priority::Low);

    env.store.set_sort_key(SortKey::Priority);
    assert_eq!(env.view_titles(), vec!["h1", "h2", "l1", "l2"]);
}

#[test]
fn test_sort_due_date_undated_last() {
    let mut env = TestEnv::new();
    env.add("no date");
    env.add_due("in five days", 5);
    env.add_due("tomorrow", 1);

    env.store.set_sort_key(SortKey::DueDate);
    assert_eq!(env.view_titles(), vec!["tomorrow", "in five days", "no date"]);
}

#[test]
fn test_sort_due_date_undated_keep_relative_order() {
    let mut env = TestEnv::new();
    env.add("undated a");
    env.add_due("dated", 2);
    env.add("undated b");

    env.store.set_sort_key(SortKey::DueDate);
    assert_eq!(env.view_titles(), vec!["dated", "undated a", "undated b"]);
}

#[test]
fn test_sort_created_at_newest_first() {
    let store = store_created_at(&[("oldest", 0), ("middle", 30), ("newest", 60)]);
    assert_eq!(titles(&store), vec!["newest", "middle", "oldest"]);
}

#[test]
fn test_sort_never_reorders_canonical_sequence() {
    let mut env = TestEnv::new();
    env.add_with_priority("a", Priority::Low);
    env.add_with_priority("b", Priority::High);

    env.store.set_sort_key(SortKey::Priority);
    let _ = env.store.view();

    let canonical: Vec<&str> = env.store.tasks().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(canonical, vec!["a", "b"]);
}

// =============================================================================
// Filtering
// =============================================================================

#[test]
fn test_filter_composition() {
    let mut env = TestEnv::new();
    let a = env.add_in_category("A", Priority::High, "work");
    let b = env.add_in_category("B", Priority::Low, "work");
    let c = env.add_in_category("C", Priority::High, "home");

    env.store
        .set_filter(Filter::new().priority(Priority::High).category("work"));

    assert_eq!(env.view_titles(), vec!["A"]);
    env.assert_in_view(&a);
    env.assert_not_in_view(&b);
    env.assert_not_in_view(&c);
}

#[test]
fn test_filter_tags_or_semantics() {
    let mut env = TestEnv::new();
    let home = env.add_with_tags("home only", &["home"]);
    let work = env.add_with_tags("work only", &["work"]);
    let both = env.add_with_tags("both", &["urgent", "work"]);

    env.store.set_filter(Filter::new().tags(["urgent", "home"]));

    env.assert_in_view(&home);
    env.assert_not_in_view(&work);
    env.assert_in_view(&both);
}

#[test]
fn test_set_filter_replaces_wholesale() {
    let mut env = TestEnv::new();
    env.add_in_category("A", Priority::High, "work");
    env.add_in_category("B", Priority::Low, "home");

    env.store.set_filter(Filter::new().priority(Priority::High));
    assert_eq!(env.view_titles(), vec!["A"]);

    // the priority option is gone, not merged
    env.store.set_filter(Filter::new().category("home"));
    assert_eq!(env.view_titles(), vec!["B"]);
    assert_eq!(env.store.filter().priority, None);

    env.store.clear_filter();
    assert_eq!(env.view_titles().len(), 2);
}

#[test]
fn test_filter_completed_false() {
    let mut env = TestEnv::new();
    let done = env.add("done");
    let open = env.add("open");
    env.store.toggle_task(&done.id);

    env.store.set_filter(Filter::new().completed(false));
    env.assert_in_view(&open);
    env.assert_not_in_view(&done);
}

#[test]
fn test_filter_then_sort() {
    let mut env = TestEnv::new();
    env.add_in_category("work low", Priority::Low, "work");
    env.add_in_category("home high", Priority::High, "home");
    env.add_in_category("work high", Priority::High, "work");

    env.store.set_sort_key(SortKey::Priority);
    env.store.set_filter(Filter::new().category("work"));
    assert_eq!(env.view_titles(), vec!["work high", "work low"]);
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn test_search_title_notes_tags_case_insensitive() {
    let mut env = TestEnv::new();
    let by_title = env.add("Renew PASSPORT");
    let by_notes = env.store.add_task(NewTask::new("Errand").with_notes("bring passport photos")).unwrap();
    let by_tag = env.add_with_tags("Travel prep", &["Passport"]);
    let unrelated = env.add("Water plants");

    env.store.set_search("passport");
    env.assert_in_view(&by_title);
    env.assert_in_view(&by_notes);
    env.assert_in_view(&by_tag);
    env.assert_not_in_view(&unrelated);
}

#[test]
fn test_search_composes_with_filter() {
    let mut env = TestEnv::new();
    let work = env.add_in_category("Call client", Priority::High, "work");
    let home = env.add_in_category("Call plumber", Priority::High, "home");

    env.store.set_search("call");
    env.store.set_filter(Filter::new().category("work"));
    env.assert_in_view(&work);
    env.assert_not_in_view(&home);

    env.store.set_search("");
    env.store.clear_filter();
    assert_eq!(env.view_titles().len(), 2);
}

// =============================================================================
// Derived state
// =============================================================================

#[test]
fn test_view_recomputed_after_mutation() {
    let mut env = TestEnv::new();
    env.store.set_filter(Filter::new().completed(true));
    let task = env.add("Eventually done");
    env.assert_not_in_view(&task);

    env.store.toggle_task(&task.id);
    env.assert_in_view(&task);
}

#[test]
fn test_version_tracks_mutations_for_caching() {
    let mut env = TestEnv::new();
    let start = env.store.version();
    let task = env.add("Versioned");
    let after_add = env.store.version();
    assert!(after_add > start);

    // no-ops leave the version alone
    env.store.toggle_task("td-missing");
    env.store.add_tag(&task.id, "x");
    let after_tag = env.store.version();
    env.store.add_tag(&task.id, "x");
    assert_eq!(env.store.version(), after_tag);
}

#[test]
fn test_progress_counts() {
    let mut env = TestEnv::new();
    let a = env.add("A");
    env.add("B");
    env.store.toggle_task(&a.id);

    let progress = env.store.progress();
    assert_eq!(progress.completed, 1);
    assert_eq!(progress.total, 2);
    assert_eq!(progress.percent(), 50.0);
}
