//! Collaborator seams: the forge that owns repositories and the remote host
//! that receives the mirror copy.
//!
//! The reconciler and the pipeline only ever talk to these traits, so tests
//! swap in in-memory fakes and the real clients live in their own crates.

use crate::error::MirrorError;
use crate::types::{Credential, CredentialKeyId, IdentifierToken, MirrorTarget, RepositoryRecord};

/// Read and registration calls against the forge.
pub trait Forge {
    /// Fetch canonical metadata, including the mirror URIs already registered.
    fn lookup_repository(&self, token: &IdentifierToken) -> Result<RepositoryRecord, MirrorError>;

    /// Execute a saved search, preserving the forge's result order.
    fn execute_query(&self, query_key: &str) -> Result<Vec<IdentifierToken>, MirrorError>;

    fn get_credential(&self, key_id: CredentialKeyId) -> Result<Credential, MirrorError>;

    /// Register `uri` as a push mirror of `repository`.
    fn set_mirror_uri(
        &self,
        repository: &RepositoryRecord,
        uri: &str,
        credential: &Credential,
    ) -> Result<(), MirrorError>;
}

/// A repository as reported by the remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepository {
    pub name: String,
    /// URI the forge should push to.
    pub mirror_uri: String,
}

/// Existence check and creation against the remote host.
pub trait RemoteHost {
    /// Account or organisation that owns mirrored repositories.
    fn owner(&self) -> &str;

    /// The name a repository gets on the remote when created from a forge
    /// repository called `forge_name`. Must be idempotent.
    fn remote_name(&self, forge_name: &str) -> String;

    fn find_repository(&self, name: &str) -> Result<Option<RemoteRepository>, MirrorError>;

    /// Create the repository; must fail with [`MirrorError::Conflict`] rather
    /// than touch a repository that already exists.
    fn create_repository(&self, target: &MirrorTarget) -> Result<RemoteRepository, MirrorError>;

    /// The mirror URI creation of `target` would yield, without any call.
    fn expected_mirror_uri(&self, target: &MirrorTarget) -> String;
}
