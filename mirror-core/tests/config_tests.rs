//! Config discovery and error-message integration tests.

use std::time::Duration;

use assert_fs::prelude::*;
use mirror_core::{config, ConfigError};
use predicates::prelude::predicate;
use predicates::Predicate;

const MINIMAL: &str = "github: gh-token\nforge: forge-token\n";

// ---------------------------------------------------------------------------
// 1. Search order
// ---------------------------------------------------------------------------

#[test]
fn config_path_env_location_wins_over_home() {
    let cfg = assert_fs::TempDir::new().expect("tempdir");
    let home = assert_fs::TempDir::new().expect("tempdir");
    cfg.child("mirror-forge/config.yml")
        .write_str("github: from-env\nforge: f\n")
        .expect("write");
    home.child(".config/mirror-forge/config.yml")
        .write_str("github: from-home\nforge: f\n")
        .expect("write");

    let candidates = config::candidate_paths_at(Some(cfg.path()), Some(home.path()));
    let loaded = config::load_first(&candidates).expect("load");
    assert_eq!(loaded.github.expose(), "from-env");
    assert!(loaded.source.starts_with(cfg.path()));
}

#[test]
fn falls_back_to_dot_dir_in_home() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".mirror-forge/config.yml")
        .write_str(MINIMAL)
        .expect("write");

    let candidates = config::candidate_paths_at(None, Some(home.path()));
    let loaded = config::load_first(&candidates).expect("load");
    assert_eq!(loaded.forge.expose(), "forge-token");
}

#[test]
fn defaults_apply_when_optional_keys_absent() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("config.yml");
    file.write_str(MINIMAL).expect("write");

    let loaded = config::load_from(file.path()).expect("load");
    assert_eq!(loaded.forge_url, config::DEFAULT_FORGE_URL);
    assert_eq!(loaded.github_org, "SoftwareHeritage");
    assert_eq!(loaded.github_api_url, "https://api.github.com");
    assert_eq!(loaded.timeout, Duration::from_secs(30));
}

#[test]
fn optional_keys_override_defaults() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("config.yml");
    file.write_str(
        "github: g\nforge: f\nforge_url: https://forge.example/\ngithub_org: acme\ntimeout_secs: 5\n",
    )
    .expect("write");

    let loaded = config::load_from(file.path()).expect("load");
    assert_eq!(loaded.forge_url, "https://forge.example");
    assert_eq!(loaded.github_org, "acme");
    assert_eq!(loaded.timeout, Duration::from_secs(5));
}

// ---------------------------------------------------------------------------
// 2. Fatal startup errors
// ---------------------------------------------------------------------------

#[test]
fn no_file_reports_every_searched_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let candidates = vec![
        home.path().join("a/mirror-forge/config.yml"),
        home.path().join("b/mirror-forge/config.yml"),
    ];

    let err = config::load_first(&candidates).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }), "got: {err}");
    let msg = err.to_string();
    assert!(msg.contains("a/mirror-forge/config.yml"), "got: {msg}");
    assert!(msg.contains("b/mirror-forge/config.yml"), "got: {msg}");
}

#[test]
fn missing_github_token_is_reported_by_key() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("config.yml");
    file.write_str("forge: f\n").expect("write");

    let err = config::load_from(file.path()).unwrap_err();
    assert!(
        matches!(err, ConfigError::MissingKey { key: "github", .. }),
        "got: {err}"
    );
    assert!(predicate::str::contains("'github'").eval(&err.to_string()));
}

#[test]
fn empty_forge_token_counts_as_missing() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("config.yml");
    file.write_str("github: g\nforge: \"  \"\n").expect("write");

    let err = config::load_from(file.path()).unwrap_err();
    assert!(
        matches!(err, ConfigError::MissingKey { key: "forge", .. }),
        "got: {err}"
    );
}

#[test]
fn corrupt_yaml_returns_parse_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("config.yml");
    file.write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = config::load_from(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yml"));
}

#[test]
fn tokens_never_appear_in_debug_output() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("config.yml");
    file.write_str("github: very-secret-gh\nforge: very-secret-forge\n")
        .expect("write");

    let loaded = config::load_from(file.path()).expect("load");
    let dump = format!("{loaded:?}");
    assert!(!dump.contains("very-secret"), "got: {dump}");
}
