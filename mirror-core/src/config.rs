//! `config.yml` discovery and loading.
//!
//! # Search order
//!
//! ```text
//! $CONFIG_PATH/mirror-forge/config.yml
//! ~/.config/mirror-forge/config.yml
//! ~/.mirror-forge/config.yml
//! /etc/mirror-forge/config.yml
//! ```
//!
//! The first existing file wins; later candidates are never merged in.
//!
//! # API pattern
//!
//! - `fn_at(…)` takes every environment input explicitly; used in tests
//! - `fn()` reads `$CONFIG_PATH` and `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::Secret;

pub const APP_DIR: &str = "mirror-forge";
pub const CONFIG_FILE: &str = "config.yml";
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

pub const DEFAULT_FORGE_URL: &str = "https://forge.softwareheritage.org";
pub const DEFAULT_GITHUB_ORG: &str = "SoftwareHeritage";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Loaded once at startup and passed by reference to every client.
#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub API token.
    pub github: Secret,
    /// Conduit API token.
    pub forge: Secret,
    pub forge_url: String,
    pub github_org: String,
    pub github_api_url: String,
    pub timeout: Duration,
    /// File the config was read from.
    pub source: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    github: Option<Secret>,
    forge: Option<Secret>,
    forge_url: Option<String>,
    github_org: Option<String>,
    github_api_url: Option<String>,
    timeout_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// Candidate locations in search order — pure, no I/O.
pub fn candidate_paths_at(config_path: Option<&Path>, home: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(base) = config_path {
        paths.push(base.join(APP_DIR).join(CONFIG_FILE));
    }
    if let Some(home) = home {
        paths.push(home.join(".config").join(APP_DIR).join(CONFIG_FILE));
        paths.push(home.join(format!(".{APP_DIR}")).join(CONFIG_FILE));
    }
    paths.push(Path::new("/etc").join(APP_DIR).join(CONFIG_FILE));
    paths
}

/// `candidate_paths_at` using `$CONFIG_PATH` and `dirs::home_dir()`.
pub fn candidate_paths() -> Vec<PathBuf> {
    let config_path = std::env::var_os(CONFIG_PATH_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    let home = dirs::home_dir();
    candidate_paths_at(config_path.as_deref(), home.as_deref())
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load the first existing file among `candidates`.
pub fn load_first(candidates: &[PathBuf]) -> Result<Config, ConfigError> {
    match candidates.iter().find(|p| p.is_file()) {
        Some(path) => load_from(path),
        None => Err(ConfigError::NotFound {
            searched: candidates.to_vec(),
        }),
    }
}

/// Search the standard locations.
pub fn load() -> Result<Config, ConfigError> {
    load_first(&candidate_paths())
}

/// Load one explicit file; no search.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: RawConfig = serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let github = require(raw.github, path, "github")?;
    let forge = require(raw.forge, path, "forge")?;

    Ok(Config {
        github,
        forge,
        forge_url: trim_url(raw.forge_url.as_deref().unwrap_or(DEFAULT_FORGE_URL)),
        github_org: raw
            .github_org
            .unwrap_or_else(|| DEFAULT_GITHUB_ORG.to_string()),
        github_api_url: trim_url(
            raw.github_api_url
                .as_deref()
                .unwrap_or(DEFAULT_GITHUB_API_URL),
        ),
        timeout: Duration::from_secs(raw.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS).max(1)),
        source: path.to_path_buf(),
    })
}

fn require(value: Option<Secret>, path: &Path, key: &'static str) -> Result<Secret, ConfigError> {
    match value {
        Some(secret) if !secret.is_empty() => Ok(secret),
        _ => Err(ConfigError::MissingKey {
            path: path.to_path_buf(),
            key,
        }),
    }
}

fn trim_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
