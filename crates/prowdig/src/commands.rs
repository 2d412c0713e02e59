// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Subcommand dispatch
//!
//! Each bucket-backed command first mirrors the recent artifacts into the
//! cache (unless `--no-download`), then reads the cache and renders a report.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use tracing::debug;

use prowdig_gcs::GcsBucket;
use prowdig_tests::{CanonicalResult, stats};

use crate::config::{Command, Config, JobsCommand, OutputFormat, TestsCommand};
use crate::fetch::parse_logs;
use crate::pipeline::{ArtifactKind, Pipeline, ProgressEvent};
use crate::report;

/// Run the configured command, writing the report to `out`.
///
/// # Errors
///
/// Returns an error if the bucket cannot be reached, the cache cannot be
/// read, or the report cannot be written.
pub async fn run(config: &Config, out: &mut impl Write) -> anyhow::Result<()> {
    let Some(command) = &config.command else {
        return Ok(());
    };
    let pipeline = build_pipeline(config)?;
    execute(command, &pipeline, out).await
}

/// Create the pipeline for a configuration, online unless `--no-download`
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created.
pub fn build_pipeline(config: &Config) -> anyhow::Result<Pipeline> {
    let settings = config.settings();
    let mut pipeline = Pipeline::new(settings.clone()).with_progress(Box::new(log_progress));
    if !config.no_download {
        let bucket = GcsBucket::new(&settings.bucket)
            .with_context(|| format!("creating client for bucket {}", settings.bucket))?;
        pipeline = pipeline.with_store(Arc::new(bucket));
    }
    Ok(pipeline)
}

fn log_progress(event: &ProgressEvent) {
    if let ProgressEvent::Progress {
        stage,
        processed,
        total,
    } = event
    {
        debug!(stage, processed, total, "Progress");
    }
}

/// Run one command against an existing pipeline
///
/// # Errors
///
/// See [`run`].
pub async fn execute(
    command: &Command,
    pipeline: &Pipeline,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        Command::Tests { output, command } => {
            run_tests(command, output.output, pipeline, out).await
        }
        Command::Jobs {
            output,
            command: JobsCommand::List { limit },
        } => {
            pipeline
                .download(limit.limit, &ArtifactKind::BUILDS)
                .await
                .context("failed to download build artifacts")?;
            let (builds, _) = pipeline
                .collect_builds(limit.limit)
                .await
                .context("failed to fetch build results from files")?;
            report::render_builds(out, output.output, &builds)?;
            Ok(())
        }
    }
}

async fn run_tests(
    command: &TestsCommand,
    format: OutputFormat,
    pipeline: &Pipeline,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let limit = match command {
        TestsCommand::ParseLogs { file_or_url } => {
            let results = parse_logs(file_or_url)
                .await
                .with_context(|| format!("while parsing {file_or_url}"))?;
            report::render_results(out, format, &results)?;
            return Ok(());
        }
        TestsCommand::List { limit, .. }
        | TestsCommand::MaxDuration { limit }
        | TestsCommand::MostFailures { limit } => limit.limit,
    };

    pipeline
        .download(limit, &ArtifactKind::TEST_RESULTS)
        .await
        .context("failed to download job artifacts")?;
    let (results, _) = pipeline
        .collect_results(limit)
        .await
        .context("failed to fetch ginkgo results from files")?;

    match command {
        TestsCommand::List {
            name, only_failed, ..
        } => {
            let results = filter_results(results, name.as_deref(), *only_failed);
            report::render_results(out, format, &results)?;
        }
        TestsCommand::MaxDuration { .. } => {
            report::render_max_duration(out, format, &stats::max_duration(&results))?;
        }
        TestsCommand::MostFailures { .. } => {
            report::render_most_failures(out, format, &stats::most_failures(&results))?;
        }
        TestsCommand::ParseLogs { .. } => {}
    }
    Ok(())
}

/// Apply the `tests list` filters and sort by name, keeping the collection
/// order of equal names
#[must_use]
pub fn filter_results(
    results: Vec<CanonicalResult>,
    name: Option<&str>,
    only_failed: bool,
) -> Vec<CanonicalResult> {
    let mut results: Vec<CanonicalResult> = results
        .into_iter()
        .filter(|r| name.is_none_or(|n| r.name.contains(n)))
        .filter(|r| !only_failed || r.failed())
        .collect();
    results.sort_by(|a, b| a.name.cmp(&b.name));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use prowdig_tests::Status;
    use similar_asserts::assert_eq;

    fn result(name: &str, status: Status, source: &str) -> CanonicalResult {
        CanonicalResult {
            name: name.to_string(),
            status,
            duration_secs: 1,
            error_message: None,
            error_location: None,
            source: source.to_string(),
            job: None,
            pull_request: None,
            build: None,
        }
    }

    #[test]
    fn test_filter_sorts_stably() {
        let results = vec![
            result("b", Status::Passed, "1"),
            result("a", Status::Failed, "2"),
            result("b", Status::Failed, "3"),
            result("a", Status::Error, "4"),
        ];
        let sources: Vec<String> = filter_results(results, None, false)
            .into_iter()
            .map(|r| r.source)
            .collect();
        assert_eq!(sources, vec!["2", "4", "1", "3"]);
    }

    #[test]
    fn test_filter_only_failed_hides_errors() {
        let results = vec![
            result("a", Status::Passed, "1"),
            result("a", Status::Failed, "2"),
            result("a", Status::Error, "3"),
        ];
        let filtered = filter_results(results, None, true);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].source, "2");
    }

    #[test]
    fn test_filter_by_name_substring() {
        let results = vec![
            result("[cert-manager] Vault Issuer", Status::Passed, "1"),
            result("[cert-manager] ACME Issuer", Status::Passed, "2"),
        ];
        let filtered = filter_results(results, Some("Vault"), false);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "[cert-manager] Vault Issuer");
    }
}
