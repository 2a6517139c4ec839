//! Client configuration.

use std::time::Duration;

use meet_core::{WorkItemId, WorkItemLinks};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::AdoError;
use crate::Result;

pub const DEFAULT_BASE_URL: &str = "https://dev.azure.com";
pub const DEFAULT_ORGANIZATION: &str = "eon-seed";
pub const DEFAULT_API_VERSION: &str = "7.1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Upper bound the service accepts for one `workitemsbatch` request.
pub const MAX_BATCH_SIZE: usize = 200;

/// Azure DevOps connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdoConfig {
    /// Service root, without organization
    pub base_url: String,
    pub organization: String,
    /// REST `api-version` query parameter
    pub api_version: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Ids per batch request (capped at [`MAX_BATCH_SIZE`])
    pub batch_size: usize,
    pub user_agent: String,
}

impl Default for AdoConfig {
    fn default() -> Self {
        AdoConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            organization: DEFAULT_ORGANIZATION.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            batch_size: MAX_BATCH_SIZE,
            user_agent: format!("meet-report/{}", meet_core::VERSION),
        }
    }
}

impl AdoConfig {
    /// Defaults, overridden by `ADO_BASE_URL`, `ADO_ORG`, `ADO_API_VERSION`
    /// and `ADO_TIMEOUT_SECS` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("ADO_BASE_URL") {
            config.base_url = v;
        }
        if let Ok(v) = std::env::var("ADO_ORG") {
            config.organization = v;
        }
        if let Ok(v) = std::env::var("ADO_API_VERSION") {
            config.api_version = v;
        }
        if let Some(secs) = std::env::var("ADO_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.timeout_secs = secs;
        }
        config
    }

    /// Config for a specific organization
    pub fn new(organization: &str) -> Self {
        AdoConfig {
            organization: organization.to_string(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size.clamp(1, MAX_BATCH_SIZE)
    }

    /// `https://dev.azure.com/<org>`
    pub fn org_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.organization
        )
    }

    /// Validate base URL and organization.
    pub fn validate(&self) -> Result<()> {
        if self.organization.trim().is_empty() {
            return Err(AdoError::InvalidConfig("organization is empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(AdoError::InvalidConfig("timeout must be positive".to_string()));
        }
        Url::parse(&self.org_url())
            .map(|_| ())
            .map_err(|e| AdoError::InvalidConfig(format!("base url: {}", e)))
    }

    /// Build `<org_url>/<project?>/<segments..>?api-version=<v>` with every
    /// path segment percent-encoded.
    pub fn api_url(&self, project: Option<&str>, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.org_url())
            .map_err(|e| AdoError::InvalidConfig(format!("base url: {}", e)))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| AdoError::InvalidConfig("base url cannot have a path".to_string()))?;
            path.pop_if_empty();
            if let Some(project) = project {
                path.push(project);
            }
            path.extend(segments);
        }
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }
}

impl WorkItemLinks for AdoConfig {
    fn edit_url(&self, project: &str, id: WorkItemId) -> String {
        let id = id.to_string();
        match Url::parse(&self.org_url()) {
            Ok(mut url) => {
                if let Ok(mut path) = url.path_segments_mut() {
                    path.pop_if_empty()
                        .extend([project, "_workitems", "edit", id.as_str()]);
                }
                url.to_string()
            }
            Err(_) => format!("{}/{}/_workitems/edit/{}", self.org_url(), project, id),
        }
    }
}
