//! Shared startup for the MEET report binaries.
//!
//! Every binary follows the same shape: parse flags, initialise tracing,
//! resolve the personal access token, build the client, run one report and
//! print it. Nothing is printed to stdout unless the whole run succeeded.
//!
//! Exit codes:
//! - `0` report printed (with or without findings)
//! - `1` any other failure (network, HTTP status, malformed payload, bad input)
//! - `2` usage error reported by clap
//! - `3` no usable credential, or the service rejected it

use std::process::ExitCode;

use ado_client::{AdoClient, AdoConfig, AdoError, AuthError};
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local};
use clap::Args;
use tracing::Level;

/// Exit code for credential failures. Kept apart from clap's usage error (2).
pub const EXIT_AUTH: u8 = 3;

/// Flags shared by every report binary.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Azure DevOps organization
    #[arg(long, env = "ADO_ORG", default_value = ado_client::config::DEFAULT_ORGANIZATION)]
    pub org: String,

    /// REST api-version
    #[arg(long, env = "ADO_API_VERSION", default_value = ado_client::config::DEFAULT_API_VERSION)]
    pub api_version: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "ADO_TIMEOUT_SECS", default_value_t = ado_client::config::DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

impl CommonArgs {
    pub fn init_tracing(&self) {
        let level = if self.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        };
        meet_core::init_tracing(self.json, level);
    }

    /// Client configuration: environment defaults overridden by flags.
    pub fn ado_config(&self) -> AdoConfig {
        let mut config = AdoConfig::from_env();
        config.organization = self.org.clone();
        config.api_version = self.api_version.clone();
        config.timeout_secs = self.timeout;
        config
    }
}

/// Resolve the credential and build the client. No request is sent.
pub fn connect(args: &CommonArgs) -> Result<AdoClient> {
    AdoClient::from_env(args.ado_config()).context("Failed to set up Azure DevOps client")
}

/// Current local time, used as the report timestamp.
pub fn now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

/// Whether `err` (or anything it wraps) is a credential problem.
pub fn is_auth_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause.downcast_ref::<AuthError>().is_some()
            || cause
                .downcast_ref::<AdoError>()
                .map(AdoError::is_auth)
                .unwrap_or(false)
    })
}

/// Numeric exit status for a failed run.
pub fn exit_status(err: &anyhow::Error) -> u8 {
    if is_auth_error(err) {
        EXIT_AUTH
    } else {
        1
    }
}

/// Exit code for a failed run.
pub fn exit_code(err: &anyhow::Error) -> ExitCode {
    ExitCode::from(exit_status(err))
}

/// Print the report on success, or the error chain on failure.
pub fn finish(outcome: Result<String>) -> ExitCode {
    match outcome {
        Ok(report) => {
            print!("{}", report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {:#}", err);
            if is_auth_error(&err) {
                eprintln!(
                    "hint: export {}=<token> or store the token in ~/{}",
                    ado_client::PAT_ENV,
                    ado_client::auth::PAT_FILE
                );
            }
            exit_code(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meet_core::CoreError;

    #[test]
    fn test_auth_errors_are_detected_through_wrapping() {
        let err = anyhow::Error::new(AuthError::NotFound {
            env: ado_client::PAT_ENV,
            file: "~/x".to_string(),
        });
        assert!(is_auth_error(&err));

        let rejected = AdoError::Status {
            operation: "WIQL query in AGI".to_string(),
            status: 401,
            body: String::new(),
        };
        let err = anyhow::Error::new(CoreError::source("WIQL query 'children'", rejected));
        assert!(is_auth_error(&err));
    }

    #[test]
    fn test_other_errors_are_not_auth() {
        let failed = AdoError::Status {
            operation: "batch fetch of 3 work items".to_string(),
            status: 500,
            body: "boom".to_string(),
        };
        let err = anyhow::Error::new(CoreError::source("batch fetch of 3 work items", failed));
        assert!(!is_auth_error(&err));

        let err = anyhow::anyhow!("stdin is not valid JSON");
        assert!(!is_auth_error(&err));
    }

    #[test]
    fn test_auth_exit_status_differs_from_usage_error() {
        use clap::Parser;

        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            common: CommonArgs,
        }

        let usage = TestCli::try_parse_from(["meet-weekly", "--bogus"])
            .err()
            .map(|e| e.exit_code());
        assert_eq!(usage, Some(2));

        let auth = anyhow::Error::new(AdoError::Status {
            operation: "WIQL query in AGI".to_string(),
            status: 403,
            body: String::new(),
        });
        assert_eq!(exit_status(&auth), EXIT_AUTH);
        assert_ne!(i32::from(EXIT_AUTH), 2);

        let other = anyhow::anyhow!("stdin is not valid JSON");
        assert_eq!(exit_status(&other), 1);
    }

    #[test]
    fn test_flags_override_config() {
        let args = CommonArgs {
            verbose: false,
            json: false,
            org: "contoso".to_string(),
            api_version: "7.0".to_string(),
            timeout: 5,
        };
        let config = args.ado_config();
        assert_eq!(config.organization, "contoso");
        assert_eq!(config.api_version, "7.0");
        assert_eq!(config.timeout_secs, 5);
    }
}
