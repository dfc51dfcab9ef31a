//! mirror-core — domain types, collaborator traits, errors and configuration
//! shared by every crate of the forge-to-GitHub mirror tool.
//!
//! - [`types`] — identifier tokens, repository records, decisions
//! - [`error`] — [`MirrorError`] taxonomy and [`ConfigError`]
//! - [`config`] — `config.yml` discovery and loading
//! - [`remote`] — the [`Forge`] and [`RemoteHost`] collaborator traits

pub mod config;
pub mod error;
pub mod remote;
pub mod types;

pub use config::Config;
pub use error::{ConfigError, ErrorKind, MirrorError};
pub use remote::{Forge, RemoteHost, RemoteRepository};
pub use types::{
    Credential, CredentialKeyId, FailureReason, IdentifierToken, MirrorDecision, MirrorTarget,
    RepositoryRecord, Secret,
};
