//! In-memory fake for [`WorkItemSource`] (testing only)
//!
//! Evaluates [`WorkItemQuery`] directly against stored snapshots, so report
//! pipelines can be exercised without a network.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{CoreError, Result, WorkItem, WorkItemId};
use crate::query::WorkItemQuery;
use crate::source::WorkItemSource;

/// In-memory work item source backed by a `BTreeMap<WorkItemId, WorkItem>`.
#[derive(Debug, Default)]
pub struct MemoryWorkItemSource {
    items: Mutex<BTreeMap<WorkItemId, WorkItem>>,
    failing_labels: Mutex<HashSet<String>>,
    fail_fetch: Mutex<bool>,
}

impl MemoryWorkItemSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: impl IntoIterator<Item = WorkItem>) -> Self {
        let source = Self::new();
        for item in items {
            source.insert(item);
        }
        source
    }

    /// Insert or replace an item.
    pub fn insert(&self, item: WorkItem) {
        self.items.lock().unwrap().insert(item.id, item);
    }

    pub fn remove(&self, id: WorkItemId) {
        self.items.lock().unwrap().remove(&id);
    }

    /// Make every query with this label fail.
    pub fn fail_query(&self, label: &str) {
        self.failing_labels.lock().unwrap().insert(label.to_string());
    }

    /// Make every `fetch` call fail.
    pub fn fail_fetch(&self) {
        *self.fail_fetch.lock().unwrap() = true;
    }
}

#[async_trait]
impl WorkItemSource for MemoryWorkItemSource {
    async fn query_ids(&self, query: &WorkItemQuery) -> Result<Vec<WorkItemId>> {
        if self.failing_labels.lock().unwrap().contains(&query.label) {
            return Err(CoreError::source(
                format!("WIQL query '{}'", query.label),
                "injected failure",
            ));
        }
        let items = self.items.lock().unwrap();
        Ok(items
            .values()
            .filter(|item| query.matches(item))
            .map(|item| item.id)
            .collect())
    }

    async fn fetch(&self, ids: &[WorkItemId]) -> Result<Vec<WorkItem>> {
        if *self.fail_fetch.lock().unwrap() {
            return Err(CoreError::source(
                format!("batch fetch of {} work items", ids.len()),
                "injected failure",
            ));
        }
        let items = self.items.lock().unwrap();
        Ok(ids.iter().filter_map(|id| items.get(id).cloned()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state;

    #[tokio::test]
    async fn test_query_and_fetch() {
        let source = MemoryWorkItemSource::with_items([
            WorkItem::new(2, "b", state::NEW).with_project("AGI"),
            WorkItem::new(1, "a", state::NEW).with_project("AGI"),
            WorkItem::new(3, "c", state::NEW).with_project("Other"),
        ]);
        let query = WorkItemQuery::features("agi", "AGI");

        let ids = source.query_ids(&query).await.unwrap();
        assert_eq!(ids, vec![WorkItemId(1), WorkItemId(2)]);

        let fetched = source.fetch(&[WorkItemId(2), WorkItemId(99)]).await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].title, "b");
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let source = MemoryWorkItemSource::new();
        source.fail_query("agi");
        let err = source
            .query_ids(&WorkItemQuery::features("agi", "AGI"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("agi"));

        source.fail_fetch();
        assert!(source.fetch(&[WorkItemId(1)]).await.is_err());
    }
}
