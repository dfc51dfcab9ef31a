//! Run orchestration shared by `sync mirror` and `sync mirrors`.
//!
//! Repositories are processed one at a time in worklist order. A failure on
//! one repository is recorded and the run moves on; an authentication
//! failure stops the run since no later call could succeed.

use mirror_core::{
    CredentialKeyId, ErrorKind, FailureReason, Forge, IdentifierToken, MirrorDecision,
    RemoteHost,
};

use crate::error::SyncError;
use crate::reconciler::reconcile;

/// Scope for a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncScope {
    /// One repository.
    Single(IdentifierToken),
    /// Every repository a saved query selects.
    Bulk(String),
}

/// Result of processing one worklist entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorOutcome {
    pub token: IdentifierToken,
    /// Forge name, when resolution got that far.
    pub name: Option<String>,
    pub decision: MirrorDecision,
}

impl MirrorOutcome {
    /// Label for status lines: the forge name if known, else the token.
    pub fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.token.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub outcomes: Vec<MirrorOutcome>,
    /// Set when an authentication failure stopped the run early.
    pub aborted: Option<FailureReason>,
    /// Worklist entries never reached because of the abort.
    pub skipped: usize,
}

impl SyncReport {
    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.decision.is_failed())
            .count()
    }

    /// `true` when no entry failed and the run was not aborted.
    pub fn is_success(&self) -> bool {
        self.aborted.is_none() && self.failed_count() == 0
    }
}

/// Run the pipeline for a scope.
///
/// `on_outcome` is invoked once per processed repository, as soon as its
/// decision is known; it is the operator-facing status channel.
pub fn run(
    forge: &impl Forge,
    remote: &impl RemoteHost,
    scope: SyncScope,
    credential_key_id: CredentialKeyId,
    dry_run: bool,
    mut on_outcome: impl FnMut(&MirrorOutcome),
) -> Result<SyncReport, SyncError> {
    let credential = forge
        .get_credential(credential_key_id)
        .map_err(|source| SyncError::Credential {
            key_id: credential_key_id,
            source,
        })?;

    let worklist = match scope {
        SyncScope::Single(token) => vec![token],
        SyncScope::Bulk(query) => {
            let tokens = forge
                .execute_query(&query)
                .map_err(|source| SyncError::Query {
                    query: query.clone(),
                    source,
                })?;
            tracing::info!(query = %query, count = tokens.len(), "worklist resolved");
            tokens
        }
    };

    let mut report = SyncReport::default();
    let total = worklist.len();

    for (index, token) in worklist.into_iter().enumerate() {
        let outcome = match forge.lookup_repository(&token) {
            Ok(record) => {
                let decision = reconcile(forge, remote, &record, &credential, dry_run);
                MirrorOutcome {
                    token,
                    name: Some(record.name),
                    decision,
                }
            }
            Err(err) => {
                tracing::warn!(repository = %token, error = %err, "repository resolution failed");
                MirrorOutcome {
                    token,
                    name: None,
                    decision: MirrorDecision::from(err),
                }
            }
        };

        on_outcome(&outcome);

        let auth_failure = match &outcome.decision {
            MirrorDecision::Failed(reason) if reason.kind == ErrorKind::Auth => {
                Some(reason.clone())
            }
            _ => None,
        };
        report.outcomes.push(outcome);

        if let Some(reason) = auth_failure {
            report.skipped = total - index - 1;
            tracing::error!(error = %reason, skipped = report.skipped, "authentication failed; aborting run");
            report.aborted = Some(reason);
            break;
        }
    }

    Ok(report)
}
