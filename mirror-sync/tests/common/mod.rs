//! In-memory forge and remote host that record every call.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use mirror_core::{
    Credential, CredentialKeyId, Forge, IdentifierToken, MirrorError, MirrorTarget, RemoteHost,
    RemoteRepository, RepositoryRecord, Secret,
};

pub const ORG: &str = "SoftwareHeritage";

pub fn record(callsign: &str, name: &str, description: &str) -> RepositoryRecord {
    RepositoryRecord {
        identifier: format!("PHID-REPO-{name}"),
        callsign: Some(callsign.to_string()),
        name: name.to_string(),
        description: description.to_string(),
        forge_url: format!("https://forge/source/{name}/"),
        existing_mirror_uris: BTreeSet::new(),
    }
}

pub fn dmod() -> RepositoryRecord {
    record("DMOD", "dmod", "Demo module")
}

pub fn credential() -> Credential {
    Credential {
        key_id: CredentialKeyId(12),
        material: Secret::new("PHID-CDTL-key"),
    }
}

// ---------------------------------------------------------------------------
// Forge
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeForge {
    pub repositories: RefCell<Vec<RepositoryRecord>>,
    pub queries: HashMap<String, Vec<IdentifierToken>>,
    pub lookup_errors: HashMap<IdentifierToken, MirrorError>,
    pub query_error: Option<MirrorError>,
    pub credential_error: Option<MirrorError>,
    pub register_error: Option<MirrorError>,
    pub lookups: RefCell<Vec<IdentifierToken>>,
    pub registrations: RefCell<Vec<(String, String)>>,
}

impl FakeForge {
    pub fn with(records: Vec<RepositoryRecord>) -> Self {
        Self {
            repositories: RefCell::new(records),
            ..Self::default()
        }
    }

    pub fn query(mut self, key: &str, tokens: Vec<IdentifierToken>) -> Self {
        self.queries.insert(key.to_string(), tokens);
        self
    }

    pub fn fail_lookup(mut self, token: IdentifierToken, err: MirrorError) -> Self {
        self.lookup_errors.insert(token, err);
        self
    }

    pub fn registration_count(&self) -> usize {
        self.registrations.borrow().len()
    }
}

impl Forge for FakeForge {
    fn lookup_repository(&self, token: &IdentifierToken) -> Result<RepositoryRecord, MirrorError> {
        self.lookups.borrow_mut().push(token.clone());
        if let Some(err) = self.lookup_errors.get(token) {
            return Err(err.clone());
        }
        self.repositories
            .borrow()
            .iter()
            .find(|r| match token {
                IdentifierToken::Numeric(_) => false,
                IdentifierToken::Global(phid) => &r.identifier == phid,
                IdentifierToken::Callsign(cs) => r.callsign.as_deref() == Some(cs.as_str()),
            })
            .cloned()
            .ok_or_else(|| MirrorError::NotFound(format!("repository {token}")))
    }

    fn execute_query(&self, query_key: &str) -> Result<Vec<IdentifierToken>, MirrorError> {
        if let Some(err) = &self.query_error {
            return Err(err.clone());
        }
        Ok(self.queries.get(query_key).cloned().unwrap_or_default())
    }

    fn get_credential(&self, key_id: CredentialKeyId) -> Result<Credential, MirrorError> {
        if let Some(err) = &self.credential_error {
            return Err(err.clone());
        }
        Ok(Credential {
            key_id,
            ..credential()
        })
    }

    fn set_mirror_uri(
        &self,
        repository: &RepositoryRecord,
        uri: &str,
        _credential: &Credential,
    ) -> Result<(), MirrorError> {
        self.registrations
            .borrow_mut()
            .push((repository.identifier.clone(), uri.to_string()));
        if let Some(err) = &self.register_error {
            return Err(err.clone());
        }
        for r in self.repositories.borrow_mut().iter_mut() {
            if r.identifier == repository.identifier {
                r.existing_mirror_uris.insert(uri.to_string());
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Remote host
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeRemote {
    /// name → mirror URI
    pub repositories: RefCell<BTreeMap<String, String>>,
    pub find_error: Option<MirrorError>,
    pub create_error: Option<MirrorError>,
    pub finds: RefCell<Vec<String>>,
    pub creations: RefCell<Vec<(String, String, String)>>,
}

impl FakeRemote {
    pub fn existing(name: &str, uri: &str) -> Self {
        let remote = Self::default();
        remote
            .repositories
            .borrow_mut()
            .insert(name.to_string(), uri.to_string());
        remote
    }

    pub fn creation_count(&self) -> usize {
        self.creations.borrow().len()
    }
}

/// Stores repositories the way GitHub does: characters outside
/// `[A-Za-z0-9._-]` become `-`. Lookups are literal.
fn hosted_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

impl RemoteHost for FakeRemote {
    fn owner(&self) -> &str {
        ORG
    }

    fn remote_name(&self, forge_name: &str) -> String {
        hosted_name(forge_name)
    }

    fn find_repository(&self, name: &str) -> Result<Option<RemoteRepository>, MirrorError> {
        self.finds.borrow_mut().push(name.to_string());
        if let Some(err) = &self.find_error {
            return Err(err.clone());
        }
        Ok(self
            .repositories
            .borrow()
            .get(name)
            .map(|uri| RemoteRepository {
                name: name.to_string(),
                mirror_uri: uri.clone(),
            }))
    }

    fn create_repository(&self, target: &MirrorTarget) -> Result<RemoteRepository, MirrorError> {
        self.creations.borrow_mut().push((
            target.repo_name.clone(),
            target.description.clone(),
            target.homepage_uri.clone(),
        ));
        if let Some(err) = &self.create_error {
            return Err(err.clone());
        }
        let name = hosted_name(&target.repo_name);
        if self.repositories.borrow().contains_key(&name) {
            return Err(MirrorError::Conflict(format!("name already exists: {name}")));
        }
        let uri = format!("git@github.com:{}/{name}.git", target.owner);
        self.repositories
            .borrow_mut()
            .insert(name.clone(), uri.clone());
        Ok(RemoteRepository {
            name,
            mirror_uri: uri,
        })
    }

    fn expected_mirror_uri(&self, target: &MirrorTarget) -> String {
        format!(
            "git@github.com:{}/{}.git",
            target.owner,
            hosted_name(&target.repo_name)
        )
    }
}
