//! # mirror-phabricator
//!
//! Conduit client for a Phabricator forge, implementing
//! [`mirror_core::Forge`].
//!
//! - [`client`] — HTTP transport and Conduit error classification
//! - [`repository`] — repository lookup by id, PHID or callsign
//! - [`query`] — saved-query execution with cursor pagination
//! - [`credential`] — passphrase credential lookup
//! - [`uri`] — mirror URI registration

pub mod client;
pub mod credential;
pub mod query;
pub mod repository;
pub mod uri;

use mirror_core::{
    Config, Credential, CredentialKeyId, Forge, IdentifierToken, MirrorError, RepositoryRecord,
};

pub use client::{ConduitCall, ConduitClient};

/// [`Forge`] backed by Conduit calls.
pub struct ConduitForge<C = ConduitClient> {
    conduit: C,
    forge_url: String,
}

impl ConduitForge<ConduitClient> {
    pub fn from_config(config: &Config) -> Self {
        Self::new(ConduitClient::from_config(config), &config.forge_url)
    }
}

impl<C: ConduitCall> ConduitForge<C> {
    pub fn new(conduit: C, forge_url: &str) -> Self {
        Self {
            conduit,
            forge_url: forge_url.trim_end_matches('/').to_string(),
        }
    }
}

impl<C: ConduitCall> Forge for ConduitForge<C> {
    fn lookup_repository(&self, token: &IdentifierToken) -> Result<RepositoryRecord, MirrorError> {
        repository::lookup(&self.conduit, &self.forge_url, token)
    }

    fn execute_query(&self, query_key: &str) -> Result<Vec<IdentifierToken>, MirrorError> {
        query::execute(&self.conduit, query_key)
    }

    fn get_credential(&self, key_id: CredentialKeyId) -> Result<Credential, MirrorError> {
        credential::resolve(&self.conduit, key_id)
    }

    fn set_mirror_uri(
        &self,
        repository: &RepositoryRecord,
        uri: &str,
        credential: &Credential,
    ) -> Result<(), MirrorError> {
        uri::register_mirror(&self.conduit, repository, uri, credential)
    }
}
