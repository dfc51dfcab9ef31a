//! Mirror reconciler.
//!
//! ## `reconcile` — per-repository protocol
//!
//! 1. Derive the [`MirrorTarget`] from the forge record, with the name
//!    spelled the way the remote host will store it.
//! 2. Ask the remote host whether the repository exists (never assumed).
//! 3. Absent: create it, or in dry-run only compute the URI it would get.
//! 4. Present: take the remote's own mirror URI, never a local guess.
//! 5. Register the URI on the forge unless it is already registered.
//!
//! Creation is the only mutating remote-host call and runs only after the
//! existence check reported absence. Re-running on a mirrored repository
//! makes no mutating call at all.

use mirror_core::{
    Credential, FailureReason, Forge, MirrorDecision, MirrorError, MirrorTarget, RemoteHost,
    RepositoryRecord,
};

/// Bring `record` in line with its remote mirror.
///
/// Never returns an error: every failure, including one that follows a
/// successful creation, is reported as [`MirrorDecision::Failed`].
pub fn reconcile(
    forge: &impl Forge,
    remote: &impl RemoteHost,
    record: &RepositoryRecord,
    credential: &Credential,
    dry_run: bool,
) -> MirrorDecision {
    let repo_name = remote.remote_name(&record.name);
    let target = MirrorTarget::from_record(remote.owner(), repo_name, record);

    // Step 2: read-only existence check.
    let existing = match remote.find_repository(&target.repo_name) {
        Ok(existing) => existing,
        Err(err) => return failed(record, err),
    };

    // Steps 3 and 4: settle on the mirror URI.
    let (mirror_uri, created) = match existing {
        Some(repo) => {
            tracing::debug!(name = %record.name, uri = %repo.mirror_uri, "remote repository exists");
            (repo.mirror_uri, false)
        }
        None if dry_run => {
            let mirror_uri = remote.expected_mirror_uri(&target);
            tracing::info!(name = %record.name, uri = %mirror_uri, "[dry-run] would create remote repository");
            let would_register = !record.existing_mirror_uris.contains(&mirror_uri);
            return MirrorDecision::DryRunPreview {
                target,
                mirror_uri,
                would_create: true,
                would_register,
            };
        }
        None => match remote.create_repository(&target) {
            Ok(repo) => (repo.mirror_uri, true),
            Err(err) => return failed(record, err),
        },
    };

    // Step 5: registration.
    if record.existing_mirror_uris.contains(&mirror_uri) {
        tracing::debug!(name = %record.name, uri = %mirror_uri, "mirror already registered");
        return if dry_run {
            MirrorDecision::DryRunPreview {
                target,
                mirror_uri,
                would_create: false,
                would_register: false,
            }
        } else if created {
            // The forge still pointed at a remote that had disappeared.
            MirrorDecision::CreatedRemoteAndRegistered { mirror_uri }
        } else {
            MirrorDecision::RemoteAlreadyExistedMirrorAlreadyRegistered { mirror_uri }
        };
    }

    if dry_run {
        tracing::info!(name = %record.name, uri = %mirror_uri, "[dry-run] would register mirror");
        return MirrorDecision::DryRunPreview {
            target,
            mirror_uri,
            would_create: false,
            would_register: true,
        };
    }

    match forge.set_mirror_uri(record, &mirror_uri, credential) {
        Ok(()) if created => MirrorDecision::CreatedRemoteAndRegistered { mirror_uri },
        Ok(()) => MirrorDecision::RemoteAlreadyExistedRegisteredMirror { mirror_uri },
        Err(err) if created => {
            tracing::warn!(name = %record.name, error = %err, "remote created but mirror registration failed");
            MirrorDecision::Failed(FailureReason {
                kind: err.kind(),
                message: format!(
                    "remote repository created at {mirror_uri}, but mirror registration failed: {err}"
                ),
            })
        }
        Err(err) => failed(record, err),
    }
}

fn failed(record: &RepositoryRecord, err: MirrorError) -> MirrorDecision {
    tracing::warn!(name = %record.name, error = %err, "reconciliation failed");
    MirrorDecision::from(err)
}
