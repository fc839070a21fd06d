use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};

/// Base URL on a port nobody is listening on.
fn closed_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    format!("http://{}", listener.local_addr().unwrap())
}

fn write_inputs(dir: &Path) {
    std::fs::write(
        dir.join("index list.json"),
        r#"{"d": [{"indextype": "NIFTY 50"}]}"#,
    )
    .unwrap();
    std::fs::write(dir.join("index mapping.json"), "[]").unwrap();
}

fn run_cli(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_niftyindices"))
        .current_dir(dir)
        .env("NIFTYINDICES_BASE_URL", closed_base_url())
        .env("NIFTYINDICES_RETRY_BACKOFF_MS", "0")
        .env("NIFTYINDICES_THROTTLE_MS", "0")
        .env("NIFTYINDICES_TIMEOUT_SECS", "5")
        .env("RUST_LOG", "niftyindices=debug")
        .args(args)
        .output()
        .expect("binary runs")
}

#[test]
fn test_json_summary_is_the_only_stdout() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());

    let output = run_cli(
        dir.path(),
        &["all", "--max-attempts", "1", "--output", "json", "--output-dir", "out"],
    );

    let stdout = String::from_utf8(output.stdout).unwrap();
    let summary: Value = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {stdout}"));
    assert_eq!(summary["total"], 1);
    assert_eq!(summary["failed"], 1);
    assert_eq!(summary["failures"][0]["index_name"], "NIFTY 50");
    assert_eq!(summary["failures"][0]["attempts"], 1);

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("NIFTY 50"), "logs missing: {stderr}");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_missing_index_list_exits_with_setup_failure() {
    let dir = tempfile::tempdir().unwrap();

    let output = run_cli(dir.path(), &["all", "--output", "json"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("index list.json"), "unexpected stderr: {stderr}");
}
