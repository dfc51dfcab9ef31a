//! mirror-forge — mirror forge repositories to GitHub.
//!
//! # Usage
//!
//! ```text
//! mirror-forge sync mirror  --repo-id <id|PHID|callsign> --credential-key-id <K> [--dry-run]
//! mirror-forge sync mirrors --query-repositories <query> --credential-key-id <K> [--dry-run]
//! ```

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::sync::SyncCommand;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "mirror-forge",
    version,
    about = "Mirror forge repositories to GitHub",
    long_about = None,
)]
struct Cli {
    /// Read this config file instead of searching the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG, when set, takes
    /// precedence. Logs go to stderr.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create GitHub mirrors and register them on the forge.
    Sync {
        #[command(subcommand)]
        command: SyncCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Sync { command } => commands::sync::run(command, cli.config.as_deref()),
    }
}

/// Filter directives: a non-empty `RUST_LOG` always wins, otherwise `-v`
/// picks the level.
fn log_filter(verbose: u8, env: Option<&str>) -> String {
    match env.map(str::trim) {
        Some(directives) if !directives.is_empty() => directives.to_string(),
        _ => match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
        .to_string(),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = EnvFilter::new(log_filter(verbose, env.as_deref()));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
