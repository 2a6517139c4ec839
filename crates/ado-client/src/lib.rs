//! ADO Client: Azure DevOps access for the MEET reports
//!
//! Resolves the personal access token, runs WIQL queries and batch-fetches
//! work items with their parent relation. Everything is read-only.
//!
//! [`AdoClient`] implements [`meet_core::WorkItemSource`], so the report
//! pipelines never see HTTP.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod wire;

pub use auth::{resolve_credential, resolve_from_env, Credential, CredentialSource, PAT_ENV};
pub use client::AdoClient;
pub use config::AdoConfig;
pub use error::{AdoError, AuthError};

/// Result type for Azure DevOps operations
pub type Result<T> = std::result::Result<T, AdoError>;
