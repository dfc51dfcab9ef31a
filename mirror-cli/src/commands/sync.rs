//! `mirror-forge sync mirror` and `mirror-forge sync mirrors`.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;

use mirror_core::{config, CredentialKeyId, IdentifierToken, MirrorDecision};
use mirror_github::GitHubClient;
use mirror_phabricator::ConduitForge;
use mirror_sync::{pipeline, MirrorOutcome, SyncReport, SyncScope};

#[derive(Subcommand, Debug)]
pub enum SyncCommand {
    /// Mirror one repository.
    Mirror(MirrorArgs),

    /// Mirror every repository a saved forge query selects.
    Mirrors(MirrorsArgs),
}

#[derive(Args, Debug)]
pub struct MirrorArgs {
    /// Repository id (42, R42), PHID or callsign (DMOD, rDMOD).
    #[arg(long = "repo-id", value_name = "TOKEN")]
    pub repo_id: IdentifierToken,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug)]
pub struct MirrorsArgs {
    /// Saved query key from the forge's repository search.
    #[arg(long = "query-repositories", value_name = "QUERY")]
    pub query: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Forge credential the mirror pushes with (12 or K12).
    #[arg(long = "credential-key-id", value_name = "KEY")]
    pub credential_key_id: CredentialKeyId,

    /// Perform every lookup and decision but create and register nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit a machine-readable JSON report instead of status lines.
    #[arg(long)]
    pub json: bool,
}

pub fn run(command: SyncCommand, config_path: Option<&Path>) -> Result<ExitCode> {
    let (scope, common) = match command {
        SyncCommand::Mirror(args) => (SyncScope::Single(args.repo_id), args.common),
        SyncCommand::Mirrors(args) => (SyncScope::Bulk(args.query), args.common),
    };

    let config = match config_path {
        Some(path) => config::load_from(path),
        None => config::load(),
    }
    .context("failed to load configuration")?;
    tracing::debug!(source = %config.source.display(), "configuration loaded");

    let forge = ConduitForge::from_config(&config);
    let github = GitHubClient::from_config(&config);

    let report = pipeline::run(
        &forge,
        &github,
        scope,
        common.credential_key_id,
        common.dry_run,
        |outcome| {
            if !common.json {
                print_outcome(outcome, common.dry_run);
            }
        },
    )
    .context("sync aborted")?;

    if common.json {
        print_json(&report, common.dry_run)?;
    } else {
        print_summary(&report);
    }

    Ok(ExitCode::from(exit_status(&report)))
}

/// Process status for a finished run: `0` when every repository was
/// mirrored or previewed, `1` when any failed or the run was aborted.
fn exit_status(report: &SyncReport) -> u8 {
    if report.is_success() {
        0
    } else {
        1
    }
}

// ---------------------------------------------------------------------------
// Status lines
// ---------------------------------------------------------------------------

fn print_outcome(outcome: &MirrorOutcome, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let label = outcome.label();
    match &outcome.decision {
        MirrorDecision::CreatedRemoteAndRegistered { mirror_uri } => println!(
            "{prefix}{} '{label}' — created {mirror_uri} and registered mirror",
            "✓".green()
        ),
        MirrorDecision::RemoteAlreadyExistedRegisteredMirror { mirror_uri } => println!(
            "{prefix}{} '{label}' — remote existed, registered mirror {mirror_uri}",
            "✓".green()
        ),
        MirrorDecision::RemoteAlreadyExistedMirrorAlreadyRegistered { mirror_uri } => println!(
            "{prefix}{} '{label}' — already mirrored at {mirror_uri}",
            "·".bright_black()
        ),
        MirrorDecision::DryRunPreview {
            mirror_uri,
            would_create,
            would_register,
            ..
        } => {
            let action = match (would_create, would_register) {
                (true, true) => format!("would create {mirror_uri} and register mirror"),
                (true, false) => format!("would create {mirror_uri} (mirror already registered)"),
                (false, true) => format!("would register mirror {mirror_uri}"),
                (false, false) => format!("already mirrored at {mirror_uri}"),
            };
            println!("{prefix}{} '{label}' — {action}", "~".yellow());
        }
        MirrorDecision::Failed(reason) => println!(
            "{prefix}{} '{label}' — failed ({}): {reason}",
            "✗".red(),
            reason.kind
        ),
    }
}

fn print_summary(report: &SyncReport) {
    let failed = report.failed_count();
    println!(
        "{} processed, {} failed",
        report.outcomes.len(),
        if failed > 0 {
            failed.to_string().red().to_string()
        } else {
            failed.to_string()
        }
    );
    if let Some(reason) = &report.aborted {
        eprintln!(
            "{} run aborted after authentication failure ({} skipped): {reason}",
            "✗".red(),
            report.skipped
        );
    }
}

// ---------------------------------------------------------------------------
// JSON report
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ReportJson {
    dry_run: bool,
    processed: usize,
    failed: usize,
    skipped: usize,
    aborted: Option<String>,
    repositories: Vec<OutcomeJson>,
}

#[derive(Serialize)]
struct OutcomeJson {
    token: String,
    name: Option<String>,
    decision: &'static str,
    mirror_uri: Option<String>,
    error_kind: Option<String>,
    error: Option<String>,
}

fn decision_key(decision: &MirrorDecision) -> &'static str {
    match decision {
        MirrorDecision::CreatedRemoteAndRegistered { .. } => "created_remote_and_registered",
        MirrorDecision::RemoteAlreadyExistedRegisteredMirror { .. } => {
            "remote_already_existed_registered_mirror"
        }
        MirrorDecision::RemoteAlreadyExistedMirrorAlreadyRegistered { .. } => {
            "remote_already_existed_mirror_already_registered"
        }
        MirrorDecision::DryRunPreview { .. } => "dry_run_preview",
        MirrorDecision::Failed(_) => "failed",
    }
}

fn print_json(report: &SyncReport, dry_run: bool) -> Result<()> {
    let payload = ReportJson {
        dry_run,
        processed: report.outcomes.len(),
        failed: report.failed_count(),
        skipped: report.skipped,
        aborted: report.aborted.as_ref().map(|r| r.message.clone()),
        repositories: report
            .outcomes
            .iter()
            .map(|o| {
                let failure = match &o.decision {
                    MirrorDecision::Failed(reason) => Some(reason),
                    _ => None,
                };
                OutcomeJson {
                    token: o.token.to_string(),
                    name: o.name.clone(),
                    decision: decision_key(&o.decision),
                    mirror_uri: o.decision.mirror_uri().map(str::to_string),
                    error_kind: failure.map(|r| r.kind.to_string()),
                    error: failure.map(|r| r.message.clone()),
                }
            })
            .collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize sync report")?
    );
    Ok(())
}
