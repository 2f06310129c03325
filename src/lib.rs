//! Tasklist: an in-memory todo store with a filtered, sorted, searchable view.
//!
//! The [`Store`] owns the canonical task collection in creation order. Every
//! mutation is synchronous; reads derive a fresh view from the active filter,
//! search text and sort key without reordering the collection.
//!
//! # Example
//!
//! ```
//! use tasklist::{Filter, NewTask, Priority, SortKey, Store};
//!
//! let mut store = Store::new();
//!
//! let milk = store.add_task(NewTask::new("Buy milk").with_priority(Priority::High)).unwrap();
//! let report = store.add_task(NewTask::new("Write report").with_priority(Priority::Low)).unwrap();
//!
//! // The report depends on the milk run (ids are not validated)
//! store.add_dependency(&report.id, &milk.id);
//!
//! store.set_sort_key(SortKey::Priority);
//! let view = store.view();
//! assert_eq!(view[0].id, milk.id);
//!
//! store.toggle_task(&milk.id);
//! store.set_filter(Filter::new().completed(true));
//! assert_eq!(store.view().len(), 1);
//! ```

mod id;
mod store;
mod types;

pub mod builder;
pub mod config;
pub mod handle;
pub mod protocol;
pub mod query;
pub mod snapshot;

// Re-export public API
pub use builder::{StoreBuilderExt, TaskBuilder};
pub use config::ShellConfig;
pub use handle::StoreHandle;
pub use protocol::{Request, Response};
pub use query::{Filter, Query, StoreQueryExt, compute_view};
pub use snapshot::{SNAPSHOT_VERSION, Snapshot};
pub use store::{Store, StoreError};
pub use types::{NewTask, Priority, Progress, SortKey, Subtask, Task, ValidationError};
