//! Azure DevOps work item tracking client
//!
//! Two read-only calls are used:
//! - `POST {org}/{project}/_apis/wit/wiql` to resolve ids
//! - `POST {org}/_apis/wit/workitemsbatch` with relations expanded

use async_trait::async_trait;
use futures::future::try_join_all;
use meet_core::{CoreError, WorkItem, WorkItemId, WorkItemQuery, WorkItemSource};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::{resolve_from_env, Credential};
use crate::config::AdoConfig;
use crate::error::{body_snippet, AdoError};
use crate::wire::{BatchRequest, BatchResponse, WiqlRequest, WiqlResponse};
use crate::Result;

/// HTTP client for the work item tracking API
pub struct AdoClient {
    config: AdoConfig,
    credential: Credential,
    http: reqwest::Client,
}

impl std::fmt::Debug for AdoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdoClient")
            .field("config", &self.config)
            .field("credential", &self.credential)
            .finish()
    }
}

impl AdoClient {
    /// Create a client. Fails on an unusable configuration; no request is
    /// sent.
    pub fn new(config: AdoConfig, credential: Credential) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(AdoError::Client)?;

        Ok(AdoClient {
            config,
            credential,
            http,
        })
    }

    /// Create a client with the credential from the environment or the
    /// token file. Fails with [`AdoError::Auth`] before any request.
    pub fn from_env(config: AdoConfig) -> Result<Self> {
        let credential = resolve_from_env()?;
        debug!(source = ?credential.source(), "credential resolved");
        Self::new(config, credential)
    }

    pub fn config(&self) -> &AdoConfig {
        &self.config
    }

    /// Run a flat WIQL query in `project`, returning ids ascending and
    /// without duplicates.
    pub async fn wiql(&self, project: &str, query: &str) -> Result<Vec<WorkItemId>> {
        let url = self
            .config
            .api_url(Some(project), &["_apis", "wit", "wiql"])?;
        let operation = format!("WIQL query in {}", project);

        let response: WiqlResponse = self
            .post_json(&operation, url, &WiqlRequest { query })
            .await?;

        let mut ids: Vec<WorkItemId> = response
            .work_items
            .into_iter()
            .map(|w| WorkItemId(w.id))
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    /// Fetch snapshots for `ids` with relations, in chunks of at most
    /// [`AdoConfig::batch_size`]. Deleted or inaccessible ids are skipped.
    pub async fn work_items_batch(&self, ids: &[WorkItemId]) -> Result<Vec<WorkItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = self
            .config
            .api_url(None, &["_apis", "wit", "workitemsbatch"])?;
        let raw: Vec<u64> = ids.iter().map(|id| id.0).collect();

        let chunks = raw.chunks(self.config.batch_size()).map(|chunk| {
            let url = url.clone();
            async move {
                let operation = format!("batch fetch of {} work items", chunk.len());
                let response: BatchResponse = self
                    .post_json(&operation, url, &BatchRequest::with_relations(chunk))
                    .await?;
                Ok::<_, AdoError>(response)
            }
        });

        let responses = try_join_all(chunks).await?;

        let items: Vec<WorkItem> = responses
            .into_iter()
            .flat_map(|r| r.value)
            .flatten()
            .map(|w| w.into_work_item())
            .collect();

        if items.len() < ids.len() {
            debug!(
                requested = ids.len(),
                received = items.len(),
                "some work items were omitted by the service"
            );
        }
        Ok(items)
    }

    async fn post_json<B, T>(&self, operation: &str, url: Url, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(%url, operation, "POST");

        let response = self
            .http
            .post(url)
            .basic_auth("", Some(self.credential.token()))
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(operation, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(operation, e))?;

        if !status.is_success() {
            warn!(operation, status = status.as_u16(), "request rejected");
            return Err(AdoError::Status {
                operation: operation.to_string(),
                status: status.as_u16(),
                body: body_snippet(&text),
            });
        }

        serde_json::from_str(&text).map_err(|source| AdoError::Decode {
            operation: operation.to_string(),
            source,
        })
    }

    fn transport_error(&self, operation: &str, source: reqwest::Error) -> AdoError {
        if source.is_timeout() {
            AdoError::Timeout {
                operation: operation.to_string(),
                secs: self.config.timeout_secs,
            }
        } else {
            AdoError::Request {
                operation: operation.to_string(),
                source,
            }
        }
    }
}

#[async_trait]
impl WorkItemSource for AdoClient {
    async fn query_ids(&self, query: &WorkItemQuery) -> meet_core::Result<Vec<WorkItemId>> {
        self.wiql(&query.project, &query.to_wiql())
            .await
            .map_err(|e| CoreError::source(format!("WIQL query '{}'", query.label), e))
    }

    async fn fetch(&self, ids: &[WorkItemId]) -> meet_core::Result<Vec<WorkItem>> {
        self.work_items_batch(ids).await.map_err(|e| {
            CoreError::source(format!("batch fetch of {} work items", ids.len()), e)
        })
    }
}
