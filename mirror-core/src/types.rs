//! Domain types for the mirror tool.
//!
//! Records fetched from the forge are immutable for the duration of one
//! reconciliation pass; decisions are produced per repository and discarded
//! after reporting.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, MirrorError};

// ---------------------------------------------------------------------------
// Secret
// ---------------------------------------------------------------------------

/// A string that must never be printed: API tokens and credential material.
///
/// `Debug` and `Display` both redact; call [`Secret::expose`] at the single
/// point where the value is put on the wire.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

// ---------------------------------------------------------------------------
// Identifier tokens
// ---------------------------------------------------------------------------

/// One way of naming a forge repository.
///
/// Parsed from operator input or produced by a saved query; the Conduit client
/// turns each variant into the matching search constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentifierToken {
    /// Numeric repository id (`42`, `R42`).
    Numeric(u64),
    /// Global object identifier (`PHID-REPO-…`).
    Global(String),
    /// Short callsign (`DMOD`, `rDMOD`).
    Callsign(String),
}

impl FromStr for IdentifierToken {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("repository identifier must not be empty".to_string());
        }
        if s.starts_with("PHID-") {
            return Ok(Self::Global(s.to_string()));
        }
        if let Ok(id) = s.parse::<u64>() {
            return Ok(Self::Numeric(id));
        }
        if let Some(rest) = s.strip_prefix('R') {
            if let Ok(id) = rest.parse::<u64>() {
                return Ok(Self::Numeric(id));
            }
        }
        // `rXYZ` is the callsign monogram; a bare lowercase callsign is not.
        let callsign = match s.strip_prefix('r') {
            Some(rest) if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_uppercase()) => {
                rest
            }
            _ => s,
        };
        if !callsign.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(format!(
                "'{s}' is not a repository id, PHID or callsign"
            ));
        }
        Ok(Self::Callsign(callsign.to_ascii_uppercase()))
    }
}

impl fmt::Display for IdentifierToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierToken::Numeric(id) => write!(f, "R{id}"),
            IdentifierToken::Global(phid) => f.write_str(phid),
            IdentifierToken::Callsign(callsign) => write!(f, "r{callsign}"),
        }
    }
}

/// Id of a passphrase credential on the forge (`12` or `K12`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CredentialKeyId(pub u64);

impl FromStr for CredentialKeyId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s.strip_prefix('K').unwrap_or(s);
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|_| format!("invalid credential key id '{s}'; expected e.g. 12 or K12"))
    }
}

impl fmt::Display for CredentialKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "K{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// Canonical forge metadata for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRecord {
    /// Global identifier; the subject of the mirror registration write.
    pub identifier: String,
    pub callsign: Option<String>,
    pub name: String,
    pub description: String,
    pub forge_url: String,
    pub existing_mirror_uris: BTreeSet<String>,
}

/// Push credential handed to the forge's mirror registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub key_id: CredentialKeyId,
    pub material: Secret,
}

/// Desired state of the remote repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorTarget {
    pub owner: String,
    pub repo_name: String,
    pub description: String,
    pub homepage_uri: String,
}

impl MirrorTarget {
    /// Description is copied verbatim and the homepage points back at the
    /// forge. `repo_name` is the record's name as the remote host spells it.
    pub fn from_record(
        owner: impl Into<String>,
        repo_name: impl Into<String>,
        record: &RepositoryRecord,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo_name: repo_name.into(),
            description: record.description.clone(),
            homepage_uri: record.forge_url.clone(),
        }
    }
}

/// Why a repository could not be mirrored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReason {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<MirrorError> for FailureReason {
    fn from(err: MirrorError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of reconciling one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorDecision {
    /// Remote repository created and mirror registered on the forge.
    CreatedRemoteAndRegistered { mirror_uri: String },
    /// Remote repository already existed; mirror registration written.
    RemoteAlreadyExistedRegisteredMirror { mirror_uri: String },
    /// Remote repository existed and the forge already mirrors to it.
    RemoteAlreadyExistedMirrorAlreadyRegistered { mirror_uri: String },
    /// `--dry-run`: what a real run would target.
    DryRunPreview {
        target: MirrorTarget,
        mirror_uri: String,
        would_create: bool,
        would_register: bool,
    },
    Failed(FailureReason),
}

impl MirrorDecision {
    pub fn is_failed(&self) -> bool {
        matches!(self, MirrorDecision::Failed(_))
    }

    pub fn mirror_uri(&self) -> Option<&str> {
        match self {
            MirrorDecision::CreatedRemoteAndRegistered { mirror_uri }
            | MirrorDecision::RemoteAlreadyExistedRegisteredMirror { mirror_uri }
            | MirrorDecision::RemoteAlreadyExistedMirrorAlreadyRegistered { mirror_uri }
            | MirrorDecision::DryRunPreview { mirror_uri, .. } => Some(mirror_uri),
            MirrorDecision::Failed(_) => None,
        }
    }
}

impl From<MirrorError> for MirrorDecision {
    fn from(err: MirrorError) -> Self {
        MirrorDecision::Failed(err.into())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("42", IdentifierToken::Numeric(42))]
    #[case("R42", IdentifierToken::Numeric(42))]
    #[case("PHID-REPO-abcdef", IdentifierToken::Global("PHID-REPO-abcdef".into()))]
    #[case("DMOD", IdentifierToken::Callsign("DMOD".into()))]
    #[case("rDMOD", IdentifierToken::Callsign("DMOD".into()))]
    #[case("dmod", IdentifierToken::Callsign("DMOD".into()))]
    #[case("  DCORE ", IdentifierToken::Callsign("DCORE".into()))]
    fn identifier_token_dispatches_by_shape(#[case] input: &str, #[case] expected: IdentifierToken) {
        assert_eq!(input.parse::<IdentifierToken>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("swh/core")]
    #[case("D MOD")]
    fn identifier_token_rejects_garbage(#[case] input: &str) {
        assert!(input.parse::<IdentifierToken>().is_err());
    }

    #[test]
    fn identifier_token_display_uses_monograms() {
        assert_eq!(IdentifierToken::Numeric(7).to_string(), "R7");
        assert_eq!(IdentifierToken::Callsign("DMOD".into()).to_string(), "rDMOD");
    }

    #[test]
    fn credential_key_id_accepts_monogram() {
        assert_eq!("K12".parse::<CredentialKeyId>().unwrap(), CredentialKeyId(12));
        assert_eq!("12".parse::<CredentialKeyId>().unwrap(), CredentialKeyId(12));
        assert!("Kx".parse::<CredentialKeyId>().is_err());
    }

    #[test]
    fn secret_is_redacted() {
        let secret = Secret::new("hunter2");
        assert_eq!(format!("{secret:?}"), "Secret(***)");
        assert_eq!(secret.to_string(), "***");
        assert_eq!(secret.expose(), "hunter2");
    }

    #[test]
    fn mirror_target_copies_record_verbatim() {
        let record = RepositoryRecord {
            identifier: "PHID-REPO-1".into(),
            callsign: Some("DMOD".into()),
            name: "dmod".into(),
            description: "Demo module".into(),
            forge_url: "https://forge/source/dmod/".into(),
            existing_mirror_uris: BTreeSet::new(),
        };
        let target = MirrorTarget::from_record("SoftwareHeritage", "dmod", &record);
        assert_eq!(target.owner, "SoftwareHeritage");
        assert_eq!(target.repo_name, "dmod");
        assert_eq!(target.description, "Demo module");
        assert_eq!(target.homepage_uri, "https://forge/source/dmod/");
    }

    #[test]
    fn failed_decision_keeps_error_kind() {
        let decision = MirrorDecision::from(MirrorError::Conflict("dmod exists".into()));
        assert!(decision.is_failed());
        assert!(decision.mirror_uri().is_none());
        match decision {
            MirrorDecision::Failed(reason) => {
                assert_eq!(reason.kind, ErrorKind::Conflict);
                assert!(reason.message.contains("dmod exists"));
            }
            other => panic!("unexpected decision: {other:?}"),
        }
    }
}
