// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Text and JSON rendering of the reports
//!
//! Text reports are one tab-separated line per row. Whether colour escapes
//! are emitted is decided globally through `colored::control`.

use std::io::{self, Write};

use colored::Colorize;
use serde::Serialize;

use prowdig_tests::{CanonicalResult, FailureCountStat, MaxDurationStat, Status};

use crate::builds::BuildResult;
use crate::config::OutputFormat;

/// Render whole seconds the way Go prints a `time.Duration`: `0s`, `55s`,
/// `1m2s`, `1h0m5s`
#[must_use]
pub fn format_duration(secs: u64) -> String {
    let (hours, minutes, seconds) = (secs / 3600, secs / 60 % 60, secs % 60);
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Write `items` as a single JSON array followed by a newline
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render_json<T: Serialize>(out: &mut impl Write, items: &[T]) -> io::Result<()> {
    serde_json::to_writer(&mut *out, items)?;
    writeln!(out)
}

/// Test results, one per line
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render_results(
    out: &mut impl Write,
    format: OutputFormat,
    results: &[CanonicalResult],
) -> io::Result<()> {
    if format == OutputFormat::Json {
        return render_json(out, results);
    }

    for result in results {
        let duration = format_duration(result.duration_secs);
        match result.status {
            Status::Passed => writeln!(out, "✅ {}\t{}", duration.green(), result.name)?,
            Status::Failed => writeln!(
                out,
                "❌ {}\t{}: {}",
                duration.red(),
                result.name,
                result.error_text()
            )?,
            Status::Error => writeln!(
                out,
                "💣️ {}\t{}: {}",
                duration.blue(),
                result.name,
                result.error_text()
            )?,
        }
    }
    Ok(())
}

/// Longest passed and failed runs: `<passed>\t<failed>\t<name>`
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render_max_duration(
    out: &mut impl Write,
    format: OutputFormat,
    stats: &[MaxDurationStat],
) -> io::Result<()> {
    if format == OutputFormat::Json {
        return render_json(out, stats);
    }

    for stat in stats {
        writeln!(
            out,
            "{}\t{}\t{}",
            format_duration(stat.max_passed_secs).green(),
            format_duration(stat.max_failed_secs).red(),
            stat.name
        )?;
    }
    Ok(())
}

/// Failure counts: `<passed>\t<failed>\t<name>: <last error>`
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render_most_failures(
    out: &mut impl Write,
    format: OutputFormat,
    stats: &[FailureCountStat],
) -> io::Result<()> {
    if format == OutputFormat::Json {
        return render_json(out, stats);
    }

    for stat in stats {
        let last_error = stat
            .last_failure()
            .map(CanonicalResult::error_text)
            .unwrap_or_default();
        writeln!(
            out,
            "{}\t{}\t{}: {}",
            stat.count_passed.to_string().green(),
            stat.count_failed.to_string().red(),
            stat.name,
            last_error.bright_black()
        )?;
    }
    Ok(())
}

/// Builds: `<duration>\t<job>`, followed by `: <err>` for failures
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render_builds(
    out: &mut impl Write,
    format: OutputFormat,
    builds: &[BuildResult],
) -> io::Result<()> {
    if format == OutputFormat::Json {
        return render_json(out, builds);
    }

    for build in builds {
        let duration = format_duration(build.duration);
        if build.succeeded() {
            writeln!(out, "{}\t{}", duration.green(), build.job_name)?;
        } else {
            writeln!(out, "{}\t{}: {}", duration.red(), build.job_name, build.err)?;
        }
    }
    Ok(())
}
