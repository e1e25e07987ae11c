//! End-to-end tests of the sync_query binary.

use std::path::Path;
use std::process::Command;

use super::fake_server::FakeBigQuery;
use serde_json::json;

const USAGE_LINE: &str = "Usage: node sync_query.js QUERY\n";

/// Runs the binary in `dir` with a scrubbed environment.
fn run(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> (i32, String, String) {
    let config = dir.join("config.toml");
    let output = Command::new(env!("CARGO_BIN_EXE_sync_query"))
        .current_dir(dir)
        .env_clear()
        .envs(env.iter().copied())
        .arg("--config")
        .arg(&config)
        .args(args)
        .output()
        .expect("Failed to execute command");

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (exit_code, stdout, stderr)
}

/// Runs the binary off the async runtime so a fake server on the same
/// runtime can keep answering.
async fn run_blocking(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> (i32, String, String) {
    let dir = dir.to_path_buf();
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let env: Vec<(String, String)> = env
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let env: Vec<(&str, &str)> = env.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        run(&dir, &args, &env)
    })
    .await
    .expect("Binary runner panicked")
}

#[test]
fn test_usage_without_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run(dir.path(), &[], &[]);
    assert_eq!(code, 0);
    assert_eq!(stdout, USAGE_LINE);
}

#[test]
fn test_usage_with_short_help() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run(dir.path(), &["-h"], &[]);
    assert_eq!(code, 0);
    assert_eq!(stdout, USAGE_LINE);
}

#[test]
fn test_usage_with_long_help() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run(dir.path(), &["--help"], &[]);
    assert_eq!(code, 0);
    assert_eq!(stdout, USAGE_LINE);
}

#[tokio::test]
async fn test_usage_issues_no_remote_call() {
    let server = FakeBigQuery::start(vec![(200, json!({"jobComplete": true}))]).await;
    let dir = tempfile::tempdir().unwrap();
    let env = [
        ("GCLOUD_PROJECT", "p"),
        ("BIGQUERY_ACCESS_TOKEN", "t"),
        ("BIGQUERY_API_URL", server.base_url()),
    ];

    for args in [&[][..], &["-h"][..], &["--help"][..], &["SELECT 1", "SELECT 2"][..]] {
        let (code, stdout, _) = run_blocking(dir.path(), args, &env).await;
        assert_eq!(code, 0);
        assert_eq!(stdout, USAGE_LINE);
    }

    assert!(server.requests().is_empty());
}

#[test]
fn test_mock_query_prints_rows() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run(
        dir.path(),
        &["--mock", "--format", "json-lines", "SELECT 1"],
        &[],
    );
    assert_eq!(code, 0);
    assert_eq!(stdout, "{\"query\":\"SELECT 1\"}\n");
}

#[test]
fn test_query_with_leading_comment() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, stderr) = run(
        dir.path(),
        &["--mock", "--format", "json-lines", "-- daily\nSELECT 1"],
        &[],
    );
    assert_eq!(code, 0, "stderr: {stderr}");
    assert_eq!(stdout, "{\"query\":\"-- daily\\nSELECT 1\"}\n");
}

#[test]
fn test_dash_v_is_a_query() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run(dir.path(), &["--mock", "--format", "json-lines", "-V"], &[]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "{\"query\":\"-V\"}\n");
}

#[test]
fn test_missing_credentials_reported() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run(dir.path(), &["SELECT 1"], &[]);
    assert_eq!(code, 1);
    assert!(stdout.starts_with("Configuration Error:"));
    assert!(stdout.contains("No project id configured"));
}

#[test]
fn test_dotenv_supplies_credentials() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".env"),
        "GCLOUD_PROJECT=from-dotenv\nBIGQUERY_ACCESS_TOKEN=t\nBIGQUERY_API_URL=not-a-url\n",
    )
    .unwrap();

    let (code, stdout, _) = run(dir.path(), &["SELECT 1"], &[]);

    // Credentials resolved, so the failure moves on to the bad API URL.
    assert_eq!(code, 1);
    assert!(stdout.contains("Invalid API URL"));
}

#[tokio::test]
async fn test_query_against_fake_server() {
    let server = FakeBigQuery::start(vec![(
        200,
        json!({
            "jobReference": {"projectId": "cli-project", "jobId": "job_1"},
            "schema": {"fields": [{"name": "word", "type": "STRING"}]},
            "rows": [{"f": [{"v": "hello"}]}, {"f": [{"v": "world"}]}],
            "jobComplete": true,
        }),
    )])
    .await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[query]\nmax_results = 100\n",
    )
    .unwrap();
    let env = [
        ("BIGQUERY_ACCESS_TOKEN", "t"),
        ("BIGQUERY_API_URL", server.base_url()),
    ];

    let (code, stdout, _) = run_blocking(
        dir.path(),
        &["--project", "cli-project", "--max-results", "2", "SELECT word"],
        &env,
    )
    .await;

    assert_eq!(code, 0);
    assert_eq!(
        stdout,
        "[\n  {\n    \"word\": \"hello\"\n  },\n  {\n    \"word\": \"world\"\n  }\n]\n"
    );

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].target, "/bigquery/v2/projects/cli-project/queries");
    assert_eq!(
        requests[0].json_body(),
        json!({"query": "SELECT word", "maxResults": 2})
    );
}
