//! Integration tests for the clib binary that need no network

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn clib_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("clib").unwrap();
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("clib.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    clib_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("uninstall"))
        .stdout(predicate::str::contains("search"));
}

#[test]
fn test_cli_version() {
    let dir = TempDir::new().unwrap();
    clib_cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_uninstall_without_owner_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    clib_cmd(&dir)
        .args(["uninstall", "buffer"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("buffer"));
}

#[test]
fn test_batch_stops_before_later_packages() {
    let dir = TempDir::new().unwrap();
    clib_cmd(&dir)
        .args(["install", "clibs/", "clibs/buffer"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to install clibs/"));
}

#[test]
fn test_install_dry_run_prints_plan() {
    let dir = TempDir::new().unwrap();
    let tmp_root = dir.path().join("work");
    let config = write_config(
        &dir,
        &format!("tmp_dir = {:?}\n", tmp_root.display().to_string()),
    );

    clib_cmd(&dir)
        .arg("--config")
        .arg(&config)
        .args(["install", "--dry-run", "clibs/buffer@0.4.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://github.com/clibs/buffer/archive/0.4.0.tar.gz",
        ))
        .stdout(predicate::str::contains("tar -xf buffer-0.4.0.tar.gz"))
        .stdout(predicate::str::contains("make install"));

    assert!(!tmp_root.exists());
}

#[test]
fn test_uninstall_dry_run_defaults_to_master() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "");

    clib_cmd(&dir)
        .arg("--config")
        .arg(&config)
        .args(["uninstall", "--dry-run", "clibs/list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list-master"))
        .stdout(predicate::str::contains("make uninstall"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let dir = TempDir::new().unwrap();
    clib_cmd(&dir)
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .args(["uninstall", "--dry-run", "clibs/list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("absent.toml"));
}

#[test]
fn test_unknown_config_key_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "registry = \"https://gitlab.com/a/b\"\n");

    clib_cmd(&dir)
        .arg("--config")
        .arg(&config)
        .args(["install", "--dry-run", "clibs/list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}
