//! Work item source abstraction.
//!
//! The reports only ever read from the tracking system through
//! [`WorkItemSource`]. The Azure DevOps client implements it over HTTP;
//! [`crate::fakes::MemoryWorkItemSource`] implements it in memory for tests.

use async_trait::async_trait;

use crate::domain::{Result, WorkItem, WorkItemId};
use crate::query::WorkItemQuery;

/// Read-only access to work items.
///
/// Guarantees expected from implementations:
/// - `query_ids` returns each matching id once, in ascending order.
/// - `fetch` returns one snapshot per known id, with custom fields and the
///   declared parent populated. Unknown ids are omitted, not an error.
/// - Any transport or decoding failure is returned as an error; no partial
///   results.
#[async_trait]
pub trait WorkItemSource: Send + Sync {
    /// Ids of the work items matching `query`.
    async fn query_ids(&self, query: &WorkItemQuery) -> Result<Vec<WorkItemId>>;

    /// Full snapshots for `ids`, including fields and parent relation.
    async fn fetch(&self, ids: &[WorkItemId]) -> Result<Vec<WorkItem>>;

    /// Run `query` and fetch every match.
    async fn query_items(&self, query: &WorkItemQuery) -> Result<Vec<WorkItem>> {
        let ids = self.query_ids(query).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch(&ids).await
    }
}
