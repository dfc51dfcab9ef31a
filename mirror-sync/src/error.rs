//! Error types for mirror-sync.

use thiserror::Error;

use mirror_core::{CredentialKeyId, MirrorError};

/// Failures that stop a run before any repository is processed.
///
/// Per-repository failures are not errors at this level: they are reported
/// as `MirrorDecision::Failed` entries in the run's report.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The push credential could not be resolved.
    #[error("cannot resolve credential {key_id}: {source}")]
    Credential {
        key_id: CredentialKeyId,
        #[source]
        source: MirrorError,
    },

    /// The saved query could not be executed.
    #[error("cannot execute query '{query}': {source}")]
    Query {
        query: String,
        #[source]
        source: MirrorError,
    },
}
