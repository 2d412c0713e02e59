// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! End-to-end command tests
//!
//! Each test parses a command line, runs it against the fixture bucket and
//! checks the rendered report.


use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use prowdig::commands::execute;
use prowdig::config::Config;
use prowdig::pipeline::Pipeline;
use similar_asserts::assert_eq;

use fixtures::{FAILING_LOG, bucket, settings};

/// Run `args` against a fresh fixture bucket cached in `cache_dir`
async fn run_online(cache_dir: &Path, args: &[&str]) -> String {
    let pipeline = Pipeline::new(settings(cache_dir)).with_store(Arc::new(bucket()));
    run_with(&pipeline, args).await
}

async fn run_with(pipeline: &Pipeline, args: &[&str]) -> String {
    colored::control::set_override(false);
    let config = Config::try_parse_from(args).expect("parse should succeed");
    let command = config.command.expect("a subcommand");

    let mut out = Vec::new();
    execute(&command, pipeline, &mut out)
        .await
        .expect("command should succeed");
    String::from_utf8(out).expect("utf-8 output")
}

#[tokio::test]
async fn test_tests_list_text() {
    let dir = tempfile::tempdir().expect("tempdir");
    let text = run_online(dir.path(), &["prowdig", "tests", "list"]).await;
    assert_eq!(
        text,
        "\
✅ 10s\t[cert-manager] ACME Issuer should issue
✅ 12s\t[cert-manager] ACME Issuer should issue
💣️ 1m1s\t[cert-manager] ACME Issuer should issue [BeforeEach]: no cluster
✅ 1m20s\t[cert-manager] Vault Issuer should be ready
❌ 5m1s\t[cert-manager] Vault Issuer should be ready: timed out waiting for the condition
✅ 1m10s\t[cert-manager] Vault Issuer should be ready
"
    );
}

#[tokio::test]
async fn test_tests_list_filters() {
    let dir = tempfile::tempdir().expect("tempdir");
    let text = run_online(
        dir.path(),
        &["prowdig", "tests", "list", "--only-failed", "--limit", "5"],
    )
    .await;
    assert_eq!(
        text,
        "❌ 5m1s\t[cert-manager] Vault Issuer should be ready: timed out waiting for the condition\n"
    );

    let text = run_online(dir.path(), &["prowdig", "tests", "list", "--name", "ACME"]).await;
    assert_eq!(text.lines().count(), 3);
}

#[tokio::test]
async fn test_tests_list_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let json = run_online(
        dir.path(),
        &["prowdig", "tests", "list", "-o", "json", "--only-failed"],
    )
    .await;
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(
        value,
        serde_json::json!([{
            "name": "[cert-manager] Vault Issuer should be ready",
            "status": "failed",
            "duration": 301,
            "err": "timed out waiting for the condition",
            "errLoc": "test/e2e/suite/issuers/vault/issuer.go:200",
            "source": "https://storage.googleapis.com/jetstack-logs/pr-logs/pull/jetstack_cert-manager/4664/pull-cert-manager-e2e-v1-24/14356/build-log.txt#line=2",
            "job": "pull-cert-manager-e2e-v1-24",
            "pr": 4664,
            "build": 14356,
        }])
    );
}

#[tokio::test]
async fn test_max_duration() {
    let dir = tempfile::tempdir().expect("tempdir");
    let text = run_online(dir.path(), &["prowdig", "tests", "max-duration"]).await;
    assert_eq!(text, "1m20s\t5m1s\t[cert-manager] Vault Issuer should be ready\n");

    let json = run_online(dir.path(), &["prowdig", "tests", "max-duration", "-o", "json"]).await;
    assert_eq!(
        json,
        "[{\"name\":\"[cert-manager] Vault Issuer should be ready\",\"maxDurationPassed\":80,\"maxDurationFailed\":301}]\n"
    );
}

#[tokio::test]
async fn test_most_failures() {
    let dir = tempfile::tempdir().expect("tempdir");
    let text = run_online(dir.path(), &["prowdig", "tests", "most-failures"]).await;
    assert_eq!(
        text,
        "2\t1\t[cert-manager] Vault Issuer should be ready: timed out waiting for the condition\n"
    );
}

#[tokio::test]
async fn test_empty_reports_render_empty_json_arrays() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pipeline = Pipeline::new(settings(dir.path()));
    for args in [
        ["prowdig", "tests", "list", "-o", "json"],
        ["prowdig", "tests", "max-duration", "-o", "json"],
        ["prowdig", "tests", "most-failures", "-o", "json"],
        ["prowdig", "jobs", "list", "-o", "json"],
    ] {
        assert_eq!(run_with(&pipeline, &args).await, "[]\n", "{args:?}");
    }
}

#[tokio::test]
async fn test_jobs_list() {
    let dir = tempfile::tempdir().expect("tempdir");
    let text = run_online(dir.path(), &["prowdig", "jobs", "list"]).await;
    assert_eq!(
        text,
        "\
41m30s\tpull-cert-manager-e2e-v1-24: Job failed.
25m0s\tpull-cert-manager-e2e-v1-24
"
    );

    let json = run_online(dir.path(), &["prowdig", "jobs", "list", "--output", "json"]).await;
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value[0]["status"], "failure");
    assert_eq!(value[0]["jobName"], "pull-cert-manager-e2e-v1-24");
    assert_eq!(value[1]["duration"], 1500);
}

#[tokio::test]
async fn test_parse_logs_from_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = dir.path().join("build-log.txt");
    std::fs::write(&log, FAILING_LOG).expect("write log");
    let path = log.display().to_string();

    let pipeline = Pipeline::new(settings(dir.path()));
    let json = run_with(
        &pipeline,
        &["prowdig", "tests", "-o", "json", "parse-logs", &path],
    )
    .await;
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    let rows = value.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["status"], "error");
    assert_eq!(rows[0]["source"], format!("{path}:17"));
    assert_eq!(rows[1]["source"], format!("{path}:2"));
    assert!(rows[1].get("pr").is_none());
}

#[tokio::test]
async fn test_parse_logs_missing_file_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pipeline = Pipeline::new(settings(dir.path()));
    let config = Config::try_parse_from([
        "prowdig",
        "tests",
        "parse-logs",
        "/nonexistent/build-log.txt",
    ])
    .expect("parse should succeed");
    let command = config.command.expect("a subcommand");

    let mut out = Vec::new();
    let err = execute(&command, &pipeline, &mut out)
        .await
        .expect_err("missing file");
    assert!(format!("{err:#}").contains("while parsing /nonexistent/build-log.txt"));
    assert!(out.is_empty());
}
