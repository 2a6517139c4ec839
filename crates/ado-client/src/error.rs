//! Error types for ado-client

use std::path::PathBuf;

use thiserror::Error;

/// Credential resolution failures. All of them are fatal before any request
/// is sent.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Neither source produced a token
    #[error(
        "no Azure DevOps personal access token found: set {env} or write the token to {file}"
    )]
    NotFound { env: &'static str, file: String },

    /// The token file exists but could not be read
    #[error("failed to read personal access token from {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while talking to Azure DevOps
#[derive(Error, Debug)]
pub enum AdoError {
    /// Credential could not be resolved
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Configuration value is unusable
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Request did not complete within the configured timeout
    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },

    /// Transport level failure
    #[error("{operation} failed: {source}")]
    Request {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status
    #[error("{operation} failed HTTP={status}: {body}")]
    Status {
        operation: String,
        status: u16,
        body: String,
    },

    /// Response body did not match the expected shape
    #[error("{operation} returned a malformed payload: {source}")]
    Decode {
        operation: String,
        #[source]
        source: serde_json::Error,
    },
}

impl AdoError {
    /// Whether this is a credential problem: no token, or one the service
    /// rejected.
    pub fn is_auth(&self) -> bool {
        matches!(self, AdoError::Auth(_))
            || matches!(self, AdoError::Status { status, .. } if *status == 401 || *status == 403)
    }
}

/// Response bodies are cut to this many characters in error messages.
pub const BODY_SNIPPET_CHARS: usize = 400;

/// First [`BODY_SNIPPET_CHARS`] characters of a response body.
pub fn body_snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_both_sources() {
        let err = AuthError::NotFound {
            env: "AZURE_DEVOPS_EXT_PAT",
            file: "~/.clawdbot/secrets/azure_devops_pat".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("AZURE_DEVOPS_EXT_PAT"));
        assert!(msg.contains("azure_devops_pat"));
    }

    #[test]
    fn test_status_error_display_and_auth_flag() {
        let err = AdoError::Status {
            operation: "WIQL query 'children'".to_string(),
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "WIQL query 'children' failed HTTP=401: unauthorized"
        );
        assert!(err.is_auth());

        let err = AdoError::Status {
            operation: "x".to_string(),
            status: 500,
            body: String::new(),
        };
        assert!(!err.is_auth());
    }

    #[test]
    fn test_missing_credential_converts_to_auth() {
        fn resolve() -> crate::Result<()> {
            Err(AuthError::NotFound {
                env: "AZURE_DEVOPS_EXT_PAT",
                file: "~/pat".to_string(),
            })?;
            Ok(())
        }

        let err = resolve().unwrap_err();
        assert!(matches!(err, AdoError::Auth(AuthError::NotFound { .. })));
        assert!(err.is_auth());
        assert!(err.to_string().starts_with("no Azure DevOps personal access token"));
    }

    #[test]
    fn test_body_snippet_truncates_on_char_boundary() {
        let long = "ä".repeat(1000);
        let snippet = body_snippet(&long);
        assert_eq!(snippet.chars().count(), BODY_SNIPPET_CHARS);
        assert_eq!(body_snippet("short"), "short");
    }
}
