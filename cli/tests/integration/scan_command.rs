//! Integration tests for `scangate scan` against a mock scan service.
//!
//! Each test starts a `wiremock` server, points the binary at it with
//! `--api-url`, and runs the binary on a blocking thread so the server keeps
//! answering while the process polls.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::process::Output;

use assert_cmd::Command;
use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{any, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE: &str = "1a2b3c4d5e6f7a8b9c0d1a2b3c4d5e6f7a8b9c0d";
const HEAD: &str = "0f9e8d7c6b5a4f3e2d1c0b9a8f7e6d5c4b3a2f1e";
const START_PATH: &str = "/api/v1/scans";
const POLL_PATH: &str = "/api/v1/scans/scn_42";

/// A `scan` invocation for the standard target, isolated from the user's
/// config and environment. No token or poll interval is set.
fn base(server: &MockServer, config_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("scangate"));
    cmd.env("NO_COLOR", "1")
        .env_remove("SCANGATE_TOKEN")
        .env_remove("SCANGATE_API_URL")
        .env(
            "SCANGATE_CONFIG",
            config_dir.path().join("config.yaml").as_os_str(),
        )
        .args([
            "scan",
            "--repo",
            "acme/payments",
            "--base",
            BASE,
            "--head",
            HEAD,
            "--branch",
            "main",
            "--api-url",
            &server.uri(),
        ]);
    cmd
}

/// `base` plus a token and a fast poll interval.
fn scan(server: &MockServer, config_dir: &TempDir, extra: &[&str]) -> Command {
    let mut cmd = base(server, config_dir);
    cmd.args(["--token", "tok_test", "--poll-interval", "0.05"])
        .args(extra);
    cmd
}

async fn run(mut cmd: Command) -> Output {
    tokio::task::spawn_blocking(move || cmd.output().expect("run scangate"))
        .await
        .expect("join blocking task")
}

async fn mount_start(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(START_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

fn pending() -> serde_json::Value {
    json!({ "complete": false })
}

fn gate_passed() -> serde_json::Value {
    json!({
        "complete": true,
        "gate_passed": true,
        "open_issues_found": 0,
        "issue_links": [],
    })
}

fn gate_failed() -> serde_json::Value {
    json!({
        "complete": true,
        "gate_passed": false,
        "open_issues_found": 3,
        "issue_links": ["https://scangate.dev/i/a", "https://scangate.dev/i/b"],
        "diff_url": "https://scangate.dev/d/42",
    })
}

// --- Gate outcomes ---

#[tokio::test]
async fn test_scan_gate_passed_exits_zero() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_start(&server, json!({ "scan_id": "scn_42" })).await;
    Mock::given(method("GET"))
        .and(path(POLL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gate_passed()))
        .expect(1)
        .mount(&server)
        .await;

    run(scan(&server, &dir, &[]))
        .await
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Quality gate passed"));
}

#[tokio::test]
async fn test_scan_polls_until_complete() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_start(&server, json!({ "scan_id": "scn_42" })).await;
    Mock::given(method("GET"))
        .and(path(POLL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(pending()))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(POLL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gate_passed()))
        .expect(1)
        .mount(&server)
        .await;

    run(scan(&server, &dir, &[])).await.assert().code(0);
}

#[tokio::test]
async fn test_scan_gate_failed_exits_ten_and_lists_issues() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_start(&server, json!({ "scan_id": "scn_42" })).await;
    Mock::given(method("GET"))
        .and(path(POLL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gate_failed()))
        .mount(&server)
        .await;

    run(scan(&server, &dir, &[]))
        .await
        .assert()
        .code(10)
        .stdout(predicate::str::contains("Quality gate failed"))
        .stdout(predicate::str::contains("3"))
        .stdout(predicate::str::contains("https://scangate.dev/i/a"))
        .stdout(predicate::str::contains("https://scangate.dev/i/b"))
        .stdout(predicate::str::contains("https://scangate.dev/d/42"));
}

#[tokio::test]
async fn test_scan_gate_failed_json_output() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_start(&server, json!({ "scan_id": "scn_42" })).await;
    Mock::given(method("GET"))
        .and(path(POLL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gate_failed()))
        .mount(&server)
        .await;

    let output = run(scan(&server, &dir, &["--json"])).await;
    assert_eq!(output.status.code(), Some(10));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["scan_id"], "scn_42");
    assert_eq!(value["gate_passed"], false);
    assert_eq!(value["open_issues_found"], 3);
    assert_eq!(value["issue_links"].as_array().map(Vec::len), Some(2));
    assert_eq!(value["diff_url"], "https://scangate.dev/d/42");
}

// --- Request forwarding ---

#[tokio::test]
async fn test_scan_forwards_target_options_and_token() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    Mock::given(method("POST"))
        .and(path(START_PATH))
        .and(header("authorization", "Bearer tok_test"))
        .and(body_json(json!({
            "repository": "acme/payments",
            "base_sha": BASE,
            "head_sha": HEAD,
            "branch": "main",
            "pr_title": "Add refunds",
            "scanners": ["secrets", "pii"],
            "fail_on_blocking": false,
            "fail_on_secrets": true,
            "min_severity": "high",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "scan_id": "scn_42" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(POLL_PATH))
        .and(header("authorization", "Bearer tok_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gate_passed()))
        .expect(1)
        .mount(&server)
        .await;

    run(scan(
        &server,
        &dir,
        &[
            "--pr-title",
            "Add refunds",
            "--scanners",
            "secrets,pii",
            "--no-fail-on-blocking",
            "--fail-on-secrets",
            "--min-severity",
            "high",
        ],
    ))
    .await
    .assert()
    .code(0);
}

#[tokio::test]
async fn test_scan_uses_stored_token() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.yaml"), "api:\n  token: tok_stored\n").unwrap();
    Mock::given(method("POST"))
        .and(path(START_PATH))
        .and(header("authorization", "Bearer tok_stored"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "scan_id": "scn_42" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(POLL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gate_passed()))
        .mount(&server)
        .await;

    let mut cmd = base(&server, &dir);
    cmd.args(["--poll-interval", "0.05"]);
    run(cmd).await.assert().code(0);
}

#[tokio::test]
async fn test_scan_quiet_pass_prints_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_start(&server, json!({ "scan_id": "scn_42" })).await;
    Mock::given(method("GET"))
        .and(path(POLL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gate_passed()))
        .mount(&server)
        .await;

    run(scan(&server, &dir, &["--quiet"]))
        .await
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
}

#[tokio::test]
async fn test_scan_explicit_credentials_ignore_broken_config() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.yaml"), "api: [not, a, mapping\n").unwrap();
    mount_start(&server, json!({ "scan_id": "scn_42" })).await;
    Mock::given(method("GET"))
        .and(path(POLL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gate_passed()))
        .mount(&server)
        .await;

    run(scan(&server, &dir, &[])).await.assert().code(0);
}

#[tokio::test]
async fn test_scan_broken_config_reports_config_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.yaml"), "api: [not, a, mapping\n").unwrap();
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut cmd = base(&server, &dir);
    cmd.args(["--poll-interval", "0.05", "--json"]);
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["code"], "config_error");
}

// --- Start failures ---

#[tokio::test]
async fn test_scan_not_found_start_hints_at_identifiers() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    Mock::given(method("POST"))
        .and(path(START_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gate_passed()))
        .expect(0)
        .mount(&server)
        .await;

    run(scan(&server, &dir, &[]))
        .await
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Double-check"));
}

#[tokio::test]
async fn test_scan_server_error_on_start_is_generic() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    Mock::given(method("POST"))
        .and(path(START_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    run(scan(&server, &dir, &[]))
        .await
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Could not start scan"))
        .stderr(predicate::str::contains("database unavailable"))
        .stderr(predicate::str::contains("Double-check").not());
}

#[tokio::test]
async fn test_scan_missing_scan_id_never_polls() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_start(&server, json!({})).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gate_passed()))
        .expect(0)
        .mount(&server)
        .await;

    run(scan(&server, &dir, &[]))
        .await
        .assert()
        .code(1)
        .stderr(predicate::str::contains("scan id"));
}

#[tokio::test]
async fn test_scan_unauthorized_json_error_code() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    Mock::given(method("POST"))
        .and(path(START_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let output = run(scan(&server, &dir, &["--json"])).await;
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "unauthorized");
}

// --- Poll failures and caps ---

#[tokio::test]
async fn test_scan_poll_error_stops_without_retry() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_start(&server, json!({ "scan_id": "scn_42" })).await;
    Mock::given(method("GET"))
        .and(path(POLL_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    run(scan(&server, &dir, &[]))
        .await
        .assert()
        .code(1)
        .stderr(predicate::str::contains("scn_42"));
}

#[tokio::test]
async fn test_scan_max_polls_gives_up() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_start(&server, json!({ "scan_id": "scn_42" })).await;
    Mock::given(method("GET"))
        .and(path(POLL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(pending()))
        .expect(2)
        .mount(&server)
        .await;

    run(scan(&server, &dir, &["--max-polls", "2"]))
        .await
        .assert()
        .code(1)
        .stderr(predicate::str::contains("did not complete after 2"));
}

// --- Input errors never reach the service ---

#[tokio::test]
async fn test_scan_invalid_poll_intervals_fail_before_any_request() {
    for interval in ["0", "-3", "abc"] {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut cmd = base(&server, &dir);
        cmd.args(["--token", "tok_test", "--poll-interval", interval]);
        run(cmd)
            .await
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Invalid poll interval"));
    }
}

#[tokio::test]
async fn test_scan_without_token_fails_before_any_request() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    run(base(&server, &dir))
        .await
        .assert()
        .code(1)
        .stderr(predicate::str::contains("scangate login"));
}
