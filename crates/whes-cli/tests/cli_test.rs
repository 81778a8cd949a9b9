//! Integration tests for the `whes` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! config handling, and exit codes — all without requiring cloud access.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `whes` binary with env isolation.
///
/// Clears all `WHES_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn whes_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("whes");
    cmd.env("HOME", "/tmp/whes-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/whes-cli-test-nonexistent")
        .env_remove("WHES_PROFILE")
        .env_remove("WHES_BASE_URL")
        .env_remove("WHES_OUTPUT")
        .env_remove("WHES_TIMEOUT")
        .env_remove("WHES_API_KEY")
        .env_remove("WHES_API_SECRET")
        .env_remove("WHES_DEFAULT_PROFILE");
    cmd
}

/// Same, but with config directories rooted at `home`.
fn whes_cmd_in(home: &Path) -> assert_cmd::Command {
    let mut cmd = whes_cmd();
    cmd.env("HOME", home).env("XDG_CONFIG_HOME", home);
    cmd
}

/// Ask the binary where it reads its config, then write `contents` there.
fn write_config(home: &Path, contents: &str) -> PathBuf {
    let output = whes_cmd_in(home).args(["config", "path"]).output().unwrap();
    assert!(output.status.success());
    let path = PathBuf::from(String::from_utf8(output.stdout).unwrap().trim());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, contents).unwrap();
    path
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = whes_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    whes_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("validate")
            .and(predicate::str::contains("fetch"))
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    whes_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("whes"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    whes_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    whes_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = whes_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_fetch_without_credentials_is_a_config_error() {
    let output = whes_cmd().arg("fetch").output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected config exit code");
    let text = combined_output(&output);
    assert!(
        text.contains("api_key"),
        "Expected the missing field to be named:\n{text}"
    );
}

#[test]
fn test_validate_without_credentials_is_a_config_error() {
    let output = whes_cmd().arg("validate").output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected config exit code");
}

#[test]
fn test_unknown_profile_fails() {
    let output = whes_cmd()
        .args(["--profile", "nosuch", "fetch"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected config exit code");
    let text = combined_output(&output);
    assert!(
        text.contains("nosuch"),
        "Expected the profile name in the error:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let output = whes_cmd()
        .args(["--output", "invalid", "fetch"])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid output format"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid")
            || text.contains("possible values")
            || text.contains("valid value"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_global_flags_parsing() {
    // All flags should parse correctly — the failure should be about
    // missing credentials, not about argument parsing.
    let output = whes_cmd()
        .args(["--output", "json", "--verbose", "--timeout", "60", "fetch"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("api_key"),
        "Expected a credential error, not a parse error:\n{text}"
    );
}

#[test]
fn test_watch_interval_flag_parses() {
    // Config resolution fails before any polling starts.
    let output = whes_cmd()
        .args(["watch", "--interval", "30"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("api_key"));
}

// ── Config subcommands ──────────────────────────────────────────────

#[test]
fn test_config_path_prints_a_path() {
    whes_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_without_a_file_renders_defaults() {
    whes_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_profile"));
}

#[test]
fn test_config_init_writes_and_refuses_overwrite() {
    let temp = tempfile::TempDir::new().unwrap();

    whes_cmd_in(temp.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stderr(predicate::str::contains("starter config"));

    // The starter profile is now visible to `config show`.
    whes_cmd_in(temp.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("profiles.home"));

    // A second init must not clobber the file.
    let output = whes_cmd_in(temp.path())
        .args(["config", "init"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("already exists"));
}

#[test]
fn test_config_show_redacts_the_secret() {
    let temp = tempfile::TempDir::new().unwrap();
    write_config(
        temp.path(),
        r#"
default_profile = "local"

[profiles.local]
api_key = "k"
api_secret = "very-secret-value"
project_id = "p1"
device_id = "d1"
ammeter_id = "a1"
"#,
    );

    whes_cmd_in(temp.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("<redacted>")
                .and(predicate::str::contains("very-secret-value").not()),
        );
}

// ── Connection failures ─────────────────────────────────────────────

/// Profile pointing at a closed local port; timeout kept short so the
/// test ends quickly even when the connection hangs instead of refusing.
const UNREACHABLE_CONFIG: &str = r#"
default_profile = "local"

[profiles.local]
base_url = "http://127.0.0.1:9/open-api"
api_key = "k"
api_secret = "s"
project_id = "p1"
device_id = "d1"
ammeter_id = "a1"
timeout = 2
"#;

#[test]
fn test_validate_unreachable_host_exits_connection_code() {
    let temp = tempfile::TempDir::new().unwrap();
    write_config(temp.path(), UNREACHABLE_CONFIG);

    let output = whes_cmd_in(temp.path()).arg("validate").output().unwrap();
    assert_eq!(
        output.status.code(),
        Some(4),
        "Expected connection exit code:\n{}",
        combined_output(&output)
    );
}

#[test]
fn test_env_credentials_satisfy_the_resolver() {
    let temp = tempfile::TempDir::new().unwrap();
    write_config(
        temp.path(),
        r#"
default_profile = "local"

[profiles.local]
base_url = "http://127.0.0.1:9/open-api"
project_id = "p1"
device_id = "d1"
ammeter_id = "a1"
timeout = 2
"#,
    );

    // Exit 4 (connection), not 2 (config): the env credentials were used.
    let output = whes_cmd_in(temp.path())
        .env("WHES_API_KEY", "k")
        .env("WHES_API_SECRET", "s")
        .arg("validate")
        .output()
        .unwrap();
    assert_eq!(
        output.status.code(),
        Some(4),
        "Expected connection exit code:\n{}",
        combined_output(&output)
    );
}
