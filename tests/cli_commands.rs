use assert_cmd::prelude::*;
use serde_json::Value;
use std::process::Command;

const FAST_CONFIG: &str = "tests/fixtures/fast.yaml";
const COMPOSER: &str = "tests/fixtures/composer.yaml";
const LOADING: &str = "tests/fixtures/loading.yaml";
const CANDIDATES: &str = "tests/fixtures/send_candidates.yaml";

fn anchorctl() -> Command {
    let mut cmd = Command::cargo_bin("anchorctl").expect("anchorctl binary");
    cmd.env_remove("RUST_LOG")
        .env_remove("ANCHOR_CACHE_TTL_MS")
        .env_remove("ANCHOR_MAX_RETRIES")
        .env_remove("ANCHOR_RETRY_DELAY_MS")
        .env_remove("ANCHOR_CACHING");
    cmd
}

fn json_output(cmd: &mut Command) -> Value {
    let assert = cmd.assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 output");
    serde_json::from_str(&stdout).expect("valid json")
}

#[test]
fn resolve_falls_back_then_hits_cache() {
    let value = json_output(anchorctl().args([
        "--config",
        FAST_CONFIG,
        "--output",
        "json",
        "resolve",
        "--page",
        COMPOSER,
        "--candidates",
        CANDIDATES,
        "--key",
        "send",
        "--repeat",
        "2",
    ]));

    let runs = value["runs"].as_array().unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0]["found"], Value::Bool(true));
    assert_eq!(runs[0]["cached"], Value::Bool(false));
    assert_eq!(runs[0]["query"].as_str(), Some(".legacy-send"));
    assert_eq!(runs[0]["node"].as_str(), Some("button.legacy-send"));
    assert_eq!(runs[1]["cached"], Value::Bool(true));

    // Three attempts on the hidden v2 button, then one malformed and one good query.
    assert_eq!(value["lookups"].as_u64(), Some(5));
    assert_eq!(value["cache"]["size"].as_u64(), Some(1));
    assert_eq!(value["cache"]["hits"].as_u64(), Some(1));
}

#[test]
fn resolve_without_key_never_caches() {
    let value = json_output(anchorctl().args([
        "--config",
        FAST_CONFIG,
        "--output",
        "json",
        "resolve",
        "--page",
        COMPOSER,
        "--candidates",
        CANDIDATES,
        "--repeat",
        "2",
    ]));

    assert_eq!(value["lookups"].as_u64(), Some(10));
    assert_eq!(value["cache"]["size"].as_u64(), Some(0));
}

#[test]
fn env_override_limits_retries() {
    let value = json_output(
        anchorctl()
            .env("ANCHOR_MAX_RETRIES", "1")
            .args([
                "--config",
                FAST_CONFIG,
                "--output",
                "json",
                "resolve",
                "--page",
                COMPOSER,
                "--candidates",
                CANDIDATES,
            ]),
    );
    assert_eq!(value["lookups"].as_u64(), Some(3));
}

#[test]
fn resolve_human_output() {
    let assert = anchorctl()
        .args([
            "--config",
            FAST_CONFIG,
            "resolve",
            "--page",
            COMPOSER,
            "--candidates",
            CANDIDATES,
        ])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("found button.legacy-send via .legacy-send"));
    assert!(stdout.contains("Lookups: 5"));
}

#[test]
fn container_is_created_once() {
    let value = json_output(anchorctl().args([
        "--config",
        FAST_CONFIG,
        "--output",
        "json",
        "container",
        "--page",
        COMPOSER,
        "--parent",
        ".composer",
        "--marker",
        "reply-assist",
        "--repeat",
        "3",
    ]));

    let runs = value["runs"].as_array().unwrap();
    assert_eq!(runs[0]["created"], Value::Bool(true));
    assert_eq!(runs[1]["created"], Value::Bool(false));
    assert_eq!(runs[0]["node"], runs[2]["node"]);
    assert_eq!(value["containers"].as_u64(), Some(1));
}

#[test]
fn container_reports_missing_parent() {
    let value = json_output(anchorctl().args([
        "--config",
        FAST_CONFIG,
        "--output",
        "json",
        "container",
        "--page",
        COMPOSER,
        "--parent",
        ".sidebar",
        "--marker",
        "reply-assist",
    ]));

    assert_eq!(value["runs"][0]["node"], Value::Null);
    assert_eq!(value["containers"].as_u64(), Some(0));
}

#[test]
fn ready_times_out_on_loading_page() {
    let value = json_output(anchorctl().args([
        "--config",
        FAST_CONFIG,
        "--output",
        "json",
        "ready",
        "--page",
        LOADING,
        "--timeout-ms",
        "50",
    ]));

    assert_eq!(value["ready"], Value::Bool(false));
    assert_eq!(value["initial_state"].as_str(), Some("loading"));
    assert!(value["elapsed_ms"].as_u64().unwrap() >= 50);
}

#[test]
fn ready_follows_simulated_completion() {
    let value = json_output(anchorctl().args([
        "--config",
        FAST_CONFIG,
        "--output",
        "json",
        "ready",
        "--page",
        LOADING,
        "--complete-after-ms",
        "20",
    ]));

    assert_eq!(value["ready"], Value::Bool(true));
    assert_eq!(value["final_state"].as_str(), Some("complete"));
    assert_eq!(value["timeout_ms"].as_u64(), Some(2000));
}

#[test]
fn info_reports_effective_config() {
    let value = json_output(anchorctl().args(["--config", FAST_CONFIG, "--output", "json", "info"]));

    assert_eq!(value["version"].as_str(), Some(env!("CARGO_PKG_VERSION")));
    assert_eq!(value["config"]["engine"]["retry_delay_ms"].as_u64(), Some(5));
    assert_eq!(value["config"]["engine"]["cache_ttl_ms"].as_u64(), Some(30000));
}

#[test]
fn missing_page_fails() {
    anchorctl()
        .args([
            "--config",
            FAST_CONFIG,
            "ready",
            "--page",
            "tests/fixtures/nope.yaml",
        ])
        .assert()
        .failure();
}

#[test]
fn log_json_writes_structured_stderr() {
    let assert = anchorctl()
        .args(["--config", FAST_CONFIG, "--log-json", "--output", "json", "info"])
        .assert()
        .success();
    let output = assert.get_output();

    let stdout: Value = serde_json::from_slice(&output.stdout).expect("stdout stays json");
    assert_eq!(stdout["config"]["engine"]["max_retries"].as_u64(), Some(3));

    let stderr = String::from_utf8(output.stderr.clone()).expect("utf8 stderr");
    let events: Vec<Value> = stderr
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("json log line"))
        .collect();
    assert!(!events.is_empty());
    assert!(events.iter().all(|event| event["level"].is_string()));
    assert!(events.iter().any(|event| {
        event["fields"]["message"]
            .as_str()
            .map_or(false, |message| message.starts_with("Starting anchorctl"))
    }));
}

#[test]
fn env_override_rejects_garbage() {
    anchorctl()
        .env("ANCHOR_CACHING", "sometimes")
        .args(["--config", FAST_CONFIG, "info"])
        .assert()
        .failure();
}
