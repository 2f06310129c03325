//! Command envelope for driving a store through a single entry point.

use crate::query::Filter;
use crate::snapshot::Snapshot;
use crate::store::Store;
use crate::types::{NewTask, Progress, SortKey, Subtask, Task};
use serde::{Deserialize, Serialize};

/// A store operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Create a new task.
    AddTask { task: NewTask },

    ToggleTask { id: String },

    DeleteTask { id: String },

    AddSubtask { task_id: String, title: String },

    ToggleSubtask { task_id: String, subtask_id: String },

    DeleteSubtask { task_id: String, subtask_id: String },

    /// Replace notes wholesale.
    UpdateNotes { task_id: String, notes: String },

    AddTag { task_id: String, tag: String },

    RemoveTag { task_id: String, tag: String },

    AddDependency { task_id: String, dependency_id: String },

    RemoveDependency { task_id: String, dependency_id: String },

    SetSortKey { sort_key: SortKey },

    /// Replace the active filter wholesale.
    SetFilter { filter: Filter },

    SetSearch { query: String },

    /// Get a task by full id or unambiguous prefix.
    Get { id: String },

    /// Current derived view plus the settings that produced it.
    View,

    Progress,

    Categories,

    /// Export the full state.
    Snapshot,

    /// Replace the full state from a snapshot.
    Restore { snapshot: Snapshot },

    Ping,

    /// Stop the owning actor after replying.
    Shutdown,
}

/// Result of applying a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Task { task: Task },

    Subtask { subtask: Subtask },

    View {
        tasks: Vec<Task>,
        sort_key: SortKey,
        filter: Filter,
        search: String,
    },

    Progress { progress: Progress },

    Categories { categories: Vec<String> },

    Snapshot { snapshot: Snapshot },

    /// Outcome of a mutation that may be a silent no-op.
    Changed { changed: bool },

    /// Addressed task does not exist.
    NotFound { id: String },

    Ok,

    Pong,

    /// Rejected input.
    Error { message: String },
}

impl Response {
    /// Create an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    fn changed(changed: bool) -> Self {
        Self::Changed { changed }
    }
}

impl Store {
    /// Apply a single request and describe the outcome.
    pub fn apply(&mut self, request: Request) -> Response {
        match request {
            Request::AddTask { task } => match self.add_task(task) {
                Ok(task) => Response::Task { task },
                Err(e) => Response::error(e.to_string()),
            },

            Request::ToggleTask { id } => Response::changed(self.toggle_task(&id)),

            Request::DeleteTask { id } => match self.delete_task(&id) {
                Some(task) => Response::Task { task },
                None => Response::NotFound { id },
            },

            Request::AddSubtask { task_id, title } => match self.add_subtask(&task_id, &title) {
                Ok(Some(subtask)) => Response::Subtask { subtask },
                Ok(None) => Response::NotFound { id: task_id },
                Err(e) => Response::error(e.to_string()),
            },

            Request::ToggleSubtask { task_id, subtask_id } => {
                Response::changed(self.toggle_subtask(&task_id, &subtask_id))
            }

            Request::DeleteSubtask { task_id, subtask_id } => match self.delete_subtask(&task_id, &subtask_id) {
                Some(subtask) => Response::Subtask { subtask },
                None => Response::changed(false),
            },

            Request::UpdateNotes { task_id, notes } => Response::changed(self.update_notes(&task_id, &notes)),

            Request::AddTag { task_id, tag } => Response::changed(self.add_tag(&task_id, &tag)),

            Request::RemoveTag { task_id, tag } => Response::changed(self.remove_tag(&task_id, &tag)),

            Request::AddDependency { task_id, dependency_id } => {
                Response::changed(self.add_dependency(&task_id, &dependency_id))
            }

            Request::RemoveDependency { task_id, dependency_id } => {
                Response::changed(self.remove_dependency(&task_id, &dependency_id))
            }

            Request::SetSortKey { sort_key } => {
                self.set_sort_key(sort_key);
                Response::Ok
            }

            Request::SetFilter { filter } => {
                self.set_filter(filter);
                Response::Ok
            }

            Request::SetSearch { query } => {
                self.set_search(&query);
                Response::Ok
            }

            Request::Get { id } => match self.resolve(&id) {
                Some(task) => Response::Task { task: task.clone() },
                None => Response::NotFound { id },
            },

            Request::View => Response::View {
                tasks: self.view().into_iter().cloned().collect(),
                sort_key: self.sort_key(),
                filter: self.filter().clone(),
                search: self.search().to_string(),
            },

            Request::Progress => Response::Progress {
                progress: self.progress(),
            },

            Request::Categories => Response::Categories {
                categories: self.categories(),
            },

            Request::Snapshot => Response::Snapshot {
                snapshot: self.snapshot(),
            },

            Request::Restore { snapshot } => match Store::from_snapshot(snapshot) {
                Ok(mut restored) => {
                    // ids issued before the restore stay retired
                    restored.issued.extend(self.issued.drain());
                    // keep the counter moving so cached views are invalidated
                    restored.version = self.version + 1;
                    *self = restored;
                    Response::Ok
                }
                Err(e) => Response::error(e.to_string()),
            },

            Request::Ping => Response::Pong,

            Request::Shutdown => Response::Ok,
        }
    }
}
