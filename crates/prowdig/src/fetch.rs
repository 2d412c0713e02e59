// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Parsing a single build log given by path or URL

use std::path::PathBuf;

use tracing::{debug, info};

use prowdig_tests::{CanonicalResult, Provenance, parse_build_log_bytes};

use crate::pipeline::PipelineError;

/// Where `tests parse-logs` reads its log from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSource {
    /// An `http://` or `https://` URL
    Url(String),
    /// A local file
    File(PathBuf),
}

impl LogSource {
    /// Interpret a command-line argument
    #[must_use]
    pub fn parse(arg: &str) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            Self::Url(arg.to_string())
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    /// Provenance attached to the results of this log
    #[must_use]
    pub fn provenance(&self) -> Provenance {
        match self {
            Self::Url(url) => Provenance::Url(url.clone()),
            Self::File(path) => Provenance::File(path.display().to_string()),
        }
    }
}

/// Read the whole log.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the request fails, or the
/// server answers with a non-success status.
pub async fn fetch_log(source: &LogSource) -> Result<Vec<u8>, PipelineError> {
    match source {
        LogSource::File(path) => tokio::fs::read(path).await.map_err(|e| PipelineError::Io {
            path: path.clone(),
            source: e,
        }),
        LogSource::Url(url) => {
            debug!(url = %url, "Fetching build log");
            let response = reqwest::get(url).await?;
            let status = response.status();
            if !status.is_success() {
                return Err(PipelineError::HttpStatus {
                    url: url.clone(),
                    status: status.as_u16(),
                });
            }
            Ok(response.bytes().await?.to_vec())
        }
    }
}

/// Parse the failure blocks of one build log, sorted by test name.
///
/// Unparseable blocks are skipped with a warning.
///
/// # Errors
///
/// Returns an error if the log cannot be read or ends inside a block.
pub async fn parse_logs(arg: &str) -> Result<Vec<CanonicalResult>, PipelineError> {
    let source = LogSource::parse(arg);
    let bytes = fetch_log(&source).await?;
    let summary = parse_build_log_bytes(&bytes, &source.provenance())?;
    info!(
        results = summary.results.len(),
        skipped = summary.skipped.len(),
        "Parsed build log"
    );

    let mut results = summary.results;
    results.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(results)
}
