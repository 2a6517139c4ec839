//! Personal access token resolution.
//!
//! Resolved once at startup, in order:
//! 1. `AZURE_DEVOPS_EXT_PAT`
//! 2. `~/.clawdbot/secrets/azure_devops_pat`
//!
//! Blank values are treated as absent.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::AuthError;

/// Environment variable holding the token.
pub const PAT_ENV: &str = "AZURE_DEVOPS_EXT_PAT";

/// Token file location relative to the home directory.
pub const PAT_FILE: &str = ".clawdbot/secrets/azure_devops_pat";

/// Where the credential came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Env,
    File(PathBuf),
}

/// Immutable credential passed to the client. The token never shows up in
/// `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    source: CredentialSource,
}

impl Credential {
    pub fn new(token: impl Into<String>, source: CredentialSource) -> Self {
        Self {
            token: token.into(),
            source,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn source(&self) -> &CredentialSource {
        &self.source
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// `~/.clawdbot/secrets/azure_devops_pat`, if a home directory is known.
pub fn default_pat_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(PAT_FILE))
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Resolve a credential from an explicit env value and token file.
///
/// A missing file is not an error (the next source, or `NotFound`, applies);
/// a file that exists but cannot be read is.
pub fn resolve_credential(
    env_value: Option<&str>,
    file: Option<&Path>,
) -> Result<Credential, AuthError> {
    if let Some(token) = env_value.and_then(non_blank) {
        debug!(source = PAT_ENV, "resolved personal access token");
        return Ok(Credential::new(token, CredentialSource::Env));
    }

    if let Some(path) = file {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                if let Some(token) = non_blank(&content) {
                    debug!(source = %path.display(), "resolved personal access token");
                    return Ok(Credential::new(
                        token,
                        CredentialSource::File(path.to_path_buf()),
                    ));
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(AuthError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    Err(AuthError::NotFound {
        env: PAT_ENV,
        file: format!("~/{}", PAT_FILE),
    })
}

/// Resolve from the process environment and the default token file.
pub fn resolve_from_env() -> Result<Credential, AuthError> {
    let env_value = std::env::var(PAT_ENV).ok();
    resolve_credential(env_value.as_deref(), default_pat_file().as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_env_wins_over_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pat");
        std::fs::write(&path, "from-file").unwrap();

        let cred = resolve_credential(Some(" from-env \n"), Some(&path)).unwrap();
        assert_eq!(cred.token(), "from-env");
        assert_eq!(cred.source(), &CredentialSource::Env);
    }

    #[test]
    fn test_file_used_when_env_blank() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pat");
        std::fs::write(&path, "from-file\n").unwrap();

        let cred = resolve_credential(Some("   "), Some(&path)).unwrap();
        assert_eq!(cred.token(), "from-file");
        assert_eq!(cred.source(), &CredentialSource::File(path));
    }

    #[test]
    fn test_missing_everywhere_is_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("does-not-exist");

        let err = resolve_credential(None, Some(&path)).unwrap_err();
        assert!(matches!(err, AuthError::NotFound { .. }));

        let err = resolve_credential(None, None).unwrap_err();
        assert!(err.to_string().contains(PAT_ENV));
    }

    #[test]
    fn test_blank_file_is_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pat");
        std::fs::write(&path, "\n\n").unwrap();

        let err = resolve_credential(None, Some(&path)).unwrap_err();
        assert!(matches!(err, AuthError::NotFound { .. }));
    }

    #[test]
    fn test_directory_is_unreadable() {
        let dir = tempdir().unwrap();
        let err = resolve_credential(None, Some(dir.path())).unwrap_err();
        assert!(matches!(err, AuthError::Unreadable { .. }));
    }

    #[test]
    fn test_debug_redacts_token() {
        let cred = Credential::new("super-secret", CredentialSource::Env);
        let dbg = format!("{:?}", cred);
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("redacted"));
    }
}
