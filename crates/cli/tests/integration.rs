//! Integration tests for the swift CLI
//!
//! These tests require a reachable Keystone and Swift deployment and a bucket
//! the credentials may write to.
//!
//! Run with:
//! ```bash
//! # Credentials as for any OpenStack client
//! source demo-openrc.sh
//! export TEST_SWIFT_BUCKET=ci-scratch
//!
//! cargo test --features integration
//! ```

#![cfg(feature = "integration")]

use std::process::{Command, Output};

/// Run the swift binary with the caller's OS_* environment
fn run_swift(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_swift"))
        .args(args)
        .args(["--no-progress", "--no-color"])
        .output()
        .expect("Failed to execute swift command")
}

fn test_bucket() -> Option<String> {
    std::env::var("OS_AUTH_URL").ok()?;
    std::env::var("TEST_SWIFT_BUCKET").ok()
}

fn unique_name(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{prefix}-{nanos}")
}

#[test]
fn test_object_lifecycle() {
    let Some(bucket) = test_bucket() else {
        eprintln!("Skipping: OS_AUTH_URL or TEST_SWIFT_BUCKET not set");
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let object = unique_name("report");
    let source = dir.path().join("report.txt");
    std::fs::write(&source, "hello world").unwrap();

    let output = run_swift(&["put", &bucket, &object, source.to_str().unwrap()]);
    assert!(output.status.success(), "put failed: {}", String::from_utf8_lossy(&output.stderr));

    let output = run_swift(&["about", &bucket, &object, "--json"]);
    assert!(output.status.success());
    let about: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(about["metadata"]["content-length"], "11");

    let output = run_swift(&["get", &bucket, &object]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"hello world");

    let output = run_swift(&["list", &bucket, &format!("^{object}$"), "--json"]);
    assert!(output.status.success());
    let listing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listing["objects"], serde_json::json!([object]));

    let output = run_swift(&["remove", &bucket, &object]);
    assert!(output.status.success());

    let output = run_swift(&["get", &bucket, &object]);
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_listing_is_sorted() {
    let Some(bucket) = test_bucket() else {
        eprintln!("Skipping: OS_AUTH_URL or TEST_SWIFT_BUCKET not set");
        return;
    };

    let output = run_swift(&["list", &bucket, "--page-size", "2"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let names: Vec<&str> = stdout.lines().collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
}
