//! End-to-end tests for the offsync binary.
//!
//! Every test runs with `--offline` so nothing leaves the machine.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CLIENT: &str = "tab-1=http://localhost:8080/";

fn offsync(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("offsync").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(dir.path().join("data"))
        .arg("--offline");
    cmd
}

#[test]
fn install_offline_completes_with_failures() {
    let dir = TempDir::new().unwrap();

    offsync(&dir)
        .arg("install")
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed: 2"))
        .stdout(predicate::str::contains("Activated."));

    offsync(&dir)
        .arg("buckets")
        .assert()
        .success()
        .stdout(predicate::str::contains("static-v1 (current, 0 entries)"))
        .stdout(predicate::str::contains("api-v1 (current, 0 entries)"));
}

#[test]
fn version_bump_deletes_stale_buckets() {
    let dir = TempDir::new().unwrap();
    offsync(&dir).arg("install").assert().success();

    std::fs::write(dir.path().join("offsync.toml"), "[cache]\nversion = \"v2\"\n").unwrap();

    offsync(&dir)
        .arg("install")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted: static-v1"))
        .stdout(predicate::str::contains("Deleted: api-v1"));
}

#[test]
fn offline_write_is_queued() {
    let dir = TempDir::new().unwrap();

    offsync(&dir)
        .args(["--client", CLIENT])
        .args(["fetch", "/api/orders", "-X", "POST", "-d", r#"{"sku":"A-1"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("HTTP 202 Accepted"))
        .stdout(predicate::str::contains("sync_id"))
        .stdout(predicate::str::contains(r#"-> tab-1: {"type":"OFFLINE_QUEUE""#));
}

#[test]
fn offline_asset_without_cache_is_503() {
    let dir = TempDir::new().unwrap();

    offsync(&dir)
        .args(["fetch", "/style.css", "--include"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HTTP 503 Service Unavailable"))
        .stdout(predicate::str::contains("content-type: text/html"));
}

#[test]
fn sync_broadcasts_flush() {
    let dir = TempDir::new().unwrap();

    offsync(&dir)
        .args(["--client", CLIENT, "sync"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"type":"SYNC_START"}"#))
        .stdout(predicate::str::contains(r#"{"type":"FLUSH_QUEUE"}"#));

    offsync(&dir)
        .args(["--client", CLIENT, "sync", "other-tag"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not handled"));
}

#[test]
fn push_without_payload_is_silent() {
    let dir = TempDir::new().unwrap();

    offsync(&dir)
        .arg("push")
        .assert()
        .success()
        .stdout(predicate::str::contains("No notification"));
}

#[test]
fn click_cross_origin_goes_to_root() {
    let dir = TempDir::new().unwrap();

    offsync(&dir)
        .args(["click", "https://evil.example/phish"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Target: /"))
        .stdout(predicate::str::contains("open window http://localhost:8080/"));
}

#[test]
fn get_version_replies_to_sender() {
    let dir = TempDir::new().unwrap();

    offsync(&dir)
        .args(["--client", CLIENT])
        .args(["message", r#"{"type":"GET_VERSION"}"#, "--from", "tab-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"-> tab-1: {"type":"VERSION","version":"v1"}"#,
        ));
}

#[test]
fn invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("offsync.toml"), "origin = 42\n").unwrap();

    offsync(&dir)
        .arg("buckets")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}
