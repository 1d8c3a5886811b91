//! Runs the `graphgen` binary end to end.

use std::{fs, process::Command};

use rstest::{fixture, rstest};
use serde_json::Value;
use tempfile::TempDir;

#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("create temp dir")
}

fn graphgen() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_graphgen"));
    command.env("RUST_LOG", "warn").env_remove("GRAPHGEN_LOG_FORMAT");
    command
}

#[rstest]
fn generate_writes_graphs_journal_and_report(temp_dir: TempDir) {
    let output = graphgen()
        .args(["generate", "--depth", "4", "--new-vertices-count", "2"])
        .args(["--graphs-count", "3", "--threads-count", "2", "--seed", "5"])
        .arg("--output-dir")
        .arg(temp_dir.path())
        .output()
        .expect("binary must run");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).expect("stdout is utf-8");
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("graphs: 3"));
    assert_eq!(lines.count(), 3);

    for index in 0..3 {
        let path = temp_dir.path().join(format!("graph_{index}.json"));
        let value: Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("graph file must exist"))
                .expect("graph file must be JSON");
        assert!(value["depth"].as_u64().is_some_and(|depth| (2..=4).contains(&depth)));
        assert!(value["vertices"].is_array());
        assert!(value["edges"].is_array());
    }

    let journal = fs::read_to_string(temp_dir.path().join("log.txt")).expect("journal must exist");
    assert_eq!(journal.matches(", Generation Started").count(), 3);
    assert_eq!(journal.matches(", Generation Finished {").count(), 3);
}

#[rstest]
fn custom_log_file_is_used(temp_dir: TempDir) {
    let log_file = temp_dir.path().join("journal").join("run.log");
    let status = graphgen()
        .args(["generate", "--depth", "2", "--new-vertices-count", "1", "--graphs-count", "1"])
        .arg("--output-dir")
        .arg(temp_dir.path().join("graphs"))
        .arg("--log-file")
        .arg(&log_file)
        .status()
        .expect("binary must run");
    assert!(status.success());
    assert!(log_file.is_file());
    assert!(!temp_dir.path().join("graphs").join("log.txt").exists());
    assert!(temp_dir.path().join("graphs").join("graph_0.json").is_file());
}

#[rstest]
fn negative_values_are_rejected(temp_dir: TempDir) {
    let output = graphgen()
        .args(["generate", "--depth", "-2", "--new-vertices-count", "1", "--graphs-count", "1"])
        .arg("--output-dir")
        .arg(temp_dir.path())
        .output()
        .expect("binary must run");
    assert!(!output.status.success());
    assert!(!temp_dir.path().join("graph_0.json").exists());
}

#[rstest]
fn unsupported_log_format_fails_fast(temp_dir: TempDir) {
    let output = graphgen()
        .env("GRAPHGEN_LOG_FORMAT", "xml")
        .args(["generate", "--depth", "1", "--new-vertices-count", "1", "--graphs-count", "1"])
        .arg("--output-dir")
        .arg(temp_dir.path())
        .output()
        .expect("binary must run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported log format `xml`"), "stderr: {stderr}");
}

#[rstest]
fn failures_are_logged_with_their_code(temp_dir: TempDir) {
    let blocker = temp_dir.path().join("occupied");
    fs::write(&blocker, "not a directory").expect("write blocker file");
    let output = graphgen()
        .args(["generate", "--depth", "2", "--new-vertices-count", "1", "--graphs-count", "1"])
        .arg("--output-dir")
        .arg(&blocker)
        .arg("--log-file")
        .arg(temp_dir.path().join("log.txt"))
        .output()
        .expect("binary must run");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("graph generation failed"), "stderr: {stderr}");
    assert!(stderr.contains("CLI_OUTPUT_IO"), "stderr: {stderr}");
}
