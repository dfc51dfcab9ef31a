//! Error types for mirror-core.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the forge and remote-host collaborators.
///
/// The variants follow the failure taxonomy the orchestrator reasons about:
/// only [`MirrorError::Auth`] aborts a run, everything else is reported
/// against the repository it happened on.
#[derive(Debug, Clone, Error)]
pub enum MirrorError {
    /// Identifier, saved query or credential does not resolve.
    #[error("not found: {0}")]
    NotFound(String),

    /// Access token rejected by either system.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Network failure, timeout, rate limit or 5xx.
    #[error("transient failure: {0}")]
    Transient(String),

    /// The remote repository appeared between the existence check and creation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The remote refused the request for another reason (validation, policy).
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The remote answered with something we could not interpret.
    #[error("unexpected response: {0}")]
    Protocol(String),
}

/// Copyable classification of a [`MirrorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Auth,
    Transient,
    Conflict,
    Rejected,
    Protocol,
}

impl MirrorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MirrorError::NotFound(_) => ErrorKind::NotFound,
            MirrorError::Auth(_) => ErrorKind::Auth,
            MirrorError::Transient(_) => ErrorKind::Transient,
            MirrorError::Conflict(_) => ErrorKind::Conflict,
            MirrorError::Rejected(_) => ErrorKind::Rejected,
            MirrorError::Protocol(_) => ErrorKind::Protocol,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not-found",
            ErrorKind::Auth => "auth",
            ErrorKind::Transient => "transient",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Rejected => "rejected",
            ErrorKind::Protocol => "protocol",
        };
        f.write_str(s)
    }
}

/// All errors that can arise while locating and loading `config.yml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure while reading a config file that exists.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error — includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// None of the candidate locations holds a config file.
    #[error("no config.yml found (searched: {})", display_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },

    /// A required token is absent or empty.
    #[error("config at {path} is missing required key '{key}'")]
    MissingKey { path: PathBuf, key: &'static str },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
