// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Conversion of parsed blocks and JUnit cases into canonical results

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::junit::{JunitCase, JunitStatus};
use crate::result::{CanonicalResult, ParsedRecord, Status};

static OBJECT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d+)/([^/]+)/(\d+)/").expect("valid object name regex"));

/// PR, job and build triple encoded in an artifact's object name
///
/// ```text
/// pr-logs/pull/jetstack_cert-manager/4664/pull-cert-manager-e2e-v1-13/14356/artifacts/junit__01.xml
///                                    <--> <-------------------------> <--->
///                                 pr number        job name        build number
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPath {
    /// Pull request number
    pub pull_request: u64,
    /// Prow job name
    pub job: String,
    /// Build number
    pub build: u64,
}

impl ArtifactPath {
    /// Extract the triple positionally from an object name
    #[must_use]
    pub fn parse(object_name: &str) -> Option<Self> {
        let caps = OBJECT_NAME.captures(object_name)?;
        Some(Self {
            pull_request: caps[1].parse().ok()?,
            job: caps[2].to_string(),
            build: caps[3].parse().ok()?,
        })
    }
}

/// Where a result was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// A local file
    File(String),
    /// A log fetched by URL
    Url(String),
    /// An artifact from the log bucket
    Artifact {
        /// Public URL of the object
        url: String,
        /// PR/job/build extracted from the object name
        path: ArtifactPath,
    },
}

impl Provenance {
    /// Source reference pointing at a line of the file
    #[must_use]
    pub fn source_at(&self, line: usize) -> String {
        match self {
            Self::File(path) => format!("{path}:{line}"),
            Self::Url(url) | Self::Artifact { url, .. } => format!("{url}#line={line}"),
        }
    }

    /// Source reference for the whole file
    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            Self::File(path) => path,
            Self::Url(url) | Self::Artifact { url, .. } => url,
        }
    }

    fn artifact_path(&self) -> Option<&ArtifactPath> {
        match self {
            Self::Artifact { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Attach provenance to a record parsed from the block starting at `start_line`
#[must_use]
pub fn normalize(
    record: ParsedRecord,
    start_line: usize,
    provenance: &Provenance,
) -> CanonicalResult {
    let path = provenance.artifact_path();
    CanonicalResult {
        name: record.name,
        status: record.outcome.into(),
        duration_secs: record.duration_secs,
        error_message: record.error_message,
        error_location: record.error_location,
        source: provenance.source_at(start_line),
        job: path.map(|p| p.job.clone()),
        pull_request: path.map(|p| p.pull_request),
        build: path.map(|p| p.build),
    }
}

/// Convert a JUnit case, keeping only passed ones.
///
/// Failures are read from build logs instead, so that they are not counted
/// twice. Sub-second durations become 0.
#[must_use]
pub fn normalize_junit(case: &JunitCase, provenance: &Provenance) -> Option<CanonicalResult> {
    if case.status != JunitStatus::Passed {
        return None;
    }

    let path = provenance.artifact_path();
    Some(CanonicalResult {
        name: case.name.clone(),
        status: Status::Passed,
        duration_secs: case.duration_secs.max(0.0).floor() as u64,
        error_message: None,
        error_location: None,
        source: provenance.source().to_string(),
        job: path.map(|p| p.job.clone()),
        pull_request: path.map(|p| p.pull_request),
        build: path.map(|p| p.build),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Outcome;
    use similar_asserts::assert_eq;

    fn record(outcome: Outcome) -> ParsedRecord {
        ParsedRecord {
            name: "[cert-manager] Vault Issuer should be ready".to_string(),
            outcome,
            duration_secs: 71,
            error_message: Some("timed out".to_string()),
            error_location: Some("issuer.go:200".to_string()),
        }
    }

    #[test]
    fn test_artifact_path_parse() {
        let path = ArtifactPath::parse(
            "pr-logs/pull/jetstack_cert-manager/4664/pull-cert-manager-e2e-v1-13/14356/artifacts/junit__01.xml",
        )
        .expect("Should parse");
        assert_eq!(
            path,
            ArtifactPath {
                pull_request: 4664,
                job: "pull-cert-manager-e2e-v1-13".to_string(),
                build: 14356,
            }
        );
        assert_eq!(ArtifactPath::parse("logs/build-log.txt"), None);
    }

    #[test]
    fn test_normalize_file_source() {
        let result = normalize(
            record(Outcome::Failed),
            122,
            &Provenance::File("build-log.txt".to_string()),
        );
        assert_eq!(result.status, Status::Failed);
        assert_eq!(result.source, "build-log.txt:122");
        assert_eq!(result.job, None);
        assert_eq!(result.error_location.as_deref(), Some("issuer.go:200"));
    }

    #[test]
    fn test_normalize_url_source() {
        let result = normalize(
            record(Outcome::SetupError),
            7,
            &Provenance::Url("https://example.com/build-log.txt".to_string()),
        );
        assert_eq!(result.status, Status::Error);
        assert_eq!(result.source, "https://example.com/build-log.txt#line=7");
    }

    #[test]
    fn test_normalize_artifact_source() {
        let provenance = Provenance::Artifact {
            url: "https://storage.googleapis.com/jetstack-logs/pr-logs/pull/jetstack_cert-manager/1234/e2e-v1-13/5678/build-log.txt".to_string(),
            path: ArtifactPath {
                pull_request: 1234,
                job: "e2e-v1-13".to_string(),
                build: 5678,
            },
        };
        let result = normalize(record(Outcome::Failed), 20, &provenance);
        assert!(result.source.ends_with("/5678/build-log.txt#line=20"));
        assert_eq!(result.job.as_deref(), Some("e2e-v1-13"));
        assert_eq!(result.pull_request, Some(1234));
        assert_eq!(result.build, Some(5678));
    }

    #[test]
    fn test_normalize_junit_keeps_passed_only() {
        let provenance = Provenance::Url("https://example.com/junit__01.xml".to_string());
        let mut case = JunitCase {
            name: "[k8s] test".to_string(),
            status: JunitStatus::Passed,
            duration_secs: 12.97,
        };

        let result = normalize_junit(&case, &provenance).expect("Should keep passed");
        assert_eq!(result.duration_secs, 12);
        assert_eq!(result.source, "https://example.com/junit__01.xml");
        assert_eq!(result.error_message, None);

        case.duration_secs = 0.4;
        let result = normalize_junit(&case, &provenance).expect("Should keep passed");
        assert_eq!(result.duration_secs, 0);

        for status in [JunitStatus::Failed, JunitStatus::Error, JunitStatus::Skipped] {
            case.status = status;
            assert_eq!(normalize_junit(&case, &provenance), None);
        }
    }
}
