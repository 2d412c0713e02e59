// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Test result types

use serde::{Deserialize, Serialize};

/// Outcome recovered from a Ginkgo failure block header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// `• Failure [...]`: the test body failed
    Failed,
    /// `• Failure in Spec Setup (...) [...]`: a setup node such as
    /// `BeforeEach` failed before the test body ran
    SetupError,
}

/// Status of a canonical test result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Test passed
    Passed,
    /// Test failed
    Failed,
    /// Test setup failed, e.g. during `BeforeEach`
    Error,
}

impl From<Outcome> for Status {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Failed => Self::Failed,
            Outcome::SetupError => Self::Error,
        }
    }
}

/// Structured content of one failure block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    /// Space-joined description hierarchy, without the `[It]` marker
    pub name: String,
    /// Whether the test body or its setup failed
    pub outcome: Outcome,
    /// Whole seconds, truncated
    pub duration_secs: u64,
    /// De-indented error text, possibly multi-line
    pub error_message: Option<String>,
    /// `file.go:line` token printed right before the block separator
    pub error_location: Option<String>,
}

/// A test result with its provenance, ready for aggregation and reporting
///
/// The same test outcome may appear twice (once from a build log, once from a
/// JUnit report); results are not de-duplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalResult {
    /// Test name, e.g. `[Conformance] Certificates with issuer type SelfSigned
    /// ClusterIssuer should issue a basic certificate`
    pub name: String,
    /// Test status
    pub status: Status,
    /// Duration in whole seconds
    #[serde(rename = "duration")]
    pub duration_secs: u64,
    /// Error message shown above the `occurred` keyword
    #[serde(rename = "err", default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Source file and line where the error was raised
    #[serde(rename = "errLoc", default, skip_serializing_if = "Option::is_none")]
    pub error_location: Option<String>,
    /// File path or URL the result came from, with a line anchor for build logs
    pub source: String,
    /// Prow job name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
    /// Pull request number
    #[serde(rename = "pr", default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<u64>,
    /// Prow build number
    #[serde(rename = "build", default, skip_serializing_if = "Option::is_none")]
    pub build: Option<u64>,
}

impl CanonicalResult {
    /// Check if the test passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == Status::Passed
    }

    /// Check if the test body failed
    #[must_use]
    pub fn failed(&self) -> bool {
        self.status == Status::Failed
    }

    /// Error message, or the empty string
    #[must_use]
    pub fn error_text(&self) -> &str {
        self.error_message.as_deref().unwrap_or_default()
    }
}
