//! Filtering, sorting and search over the task collection.

use crate::store::Store;
use crate::types::{Priority, SortKey, Task, normalize_labels, normalize_optional, push_unique};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Narrowing options for the derived view. Absent options impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,

    /// Any-of match. Empty means no tag constraint.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        push_unique(&mut self.tags, &tag.into());
        self
    }

    pub fn tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for tag in tags {
            push_unique(&mut self.tags, &tag.into());
        }
        self
    }

    /// Trim category and tags the way task fields are trimmed on write.
    /// A blank category becomes no constraint.
    pub fn normalized(self) -> Self {
        Self {
            category: normalize_optional(self.category.as_deref()),
            tags: normalize_labels(&self.tags),
            ..self
        }
    }

    /// True when no option is set.
    pub fn is_empty(&self) -> bool {
        self.priority.is_none() && self.category.is_none() && self.completed.is_none() && self.tags.is_empty()
    }

    /// Check a task against every present option.
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(priority) = self.priority
            && task.priority != priority
        {
            return false;
        }
        if let Some(category) = &self.category
            && task.category.as_deref() != Some(category.as_str())
        {
            return false;
        }
        if let Some(completed) = self.completed
            && task.completed != completed
        {
            return false;
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|t| task.has_tag(t)) {
            return false;
        }
        true
    }
}

fn compare(a: &Task, b: &Task, sort_key: SortKey) -> Ordering {
    match sort_key {
        SortKey::Priority => a.priority.rank().cmp(&b.priority.rank()),
        SortKey::DueDate => match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortKey::CreatedAt => b.created_at.cmp(&a.created_at),
    }
}

/// Derive the filtered, searched and sorted view of `tasks`.
///
/// The sort is stable, so ties keep canonical order. `tasks` is never reordered.
pub fn compute_view<'a>(tasks: &'a [Task], sort_key: SortKey, filter: &Filter, search: &str) -> Vec<&'a Task> {
    let needle = search.to_lowercase();
    let mut view: Vec<&Task> = tasks
        .iter()
        .filter(|t| filter.matches(t) && t.matches_search(&needle))
        .collect();
    view.sort_by(|a, b| compare(a, b, sort_key));
    view
}

/// Query builder for one-off queries, independent of the store's active view settings.
pub struct Query<'a> {
    store: &'a Store,
    filter: Filter,
    search: String,
    sort_key: SortKey,
    limit: Option<usize>,
    offset: usize,
}

impl<'a> Query<'a> {
    pub(crate) fn new(store: &'a Store) -> Self {
        Self {
            store,
            filter: Filter::new(),
            search: String::new(),
            sort_key: SortKey::default(),
            limit: None,
            offset: 0,
        }
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.filter = self.filter.priority(priority);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.filter = self.filter.category(category);
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.filter = self.filter.completed(completed);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.filter = self.filter.tag(tag);
        self
    }

    /// Free-text match over title, notes and tags.
    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search = query.into();
        self
    }

    pub fn sort_by(mut self, sort_key: SortKey) -> Self {
        self.sort_key = sort_key;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Execute the query and return matching tasks.
    pub fn execute(self) -> Vec<Task> {
        let filter = self.filter.normalized();
        let view = compute_view(self.store.tasks(), self.sort_key, &filter, &self.search);
        view.into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    /// Count matching tasks, ignoring limit and offset.
    pub fn count(self) -> usize {
        let filter = self.filter.normalized();
        compute_view(self.store.tasks(), self.sort_key, &filter, &self.search).len()
    }
}

/// Extension trait to add query methods to Store.
pub trait StoreQueryExt {
    /// Start building a query.
    fn query(&self) -> Query<'_>;

    /// Query with a pre-built filter, default sort, no search.
    fn query_with_filter(&self, filter: &Filter) -> Vec<Task>;
}

impl StoreQueryExt for Store {
    fn query(&self) -> Query<'_> {
        Query::new(self)
    }

    fn query_with_filter(&self, filter: &Filter) -> Vec<Task> {
        let filter = filter.clone().normalized();
        compute_view(self.tasks(), SortKey::default(), &filter, "")
            .into_iter()
            .cloned()
            .collect()
    }
}
