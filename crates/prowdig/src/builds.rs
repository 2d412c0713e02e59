// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Build summaries from `prowjob.json`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Final state of a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    /// The job succeeded
    Success,
    /// The job failed or errored
    Failure,
}

/// One finished build of a Prow job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResult {
    /// Final state
    pub status: BuildStatus,
    /// Whole seconds between start and completion
    pub duration: u64,
    /// Prow UI page of the build
    pub url: String,
    /// Job name, e.g. `pull-cert-manager-e2e-v1-24`
    pub job_name: String,
    /// Failure description, empty on success
    pub err: String,
}

impl BuildResult {
    /// Check if the build succeeded
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.status == BuildStatus::Success
    }
}

#[derive(Debug, Deserialize)]
struct ProwJob {
    #[serde(default)]
    spec: ProwJobSpec,
    status: ProwJobStatus,
}

#[derive(Debug, Default, Deserialize)]
struct ProwJobSpec {
    #[serde(default)]
    job: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProwJobStatus {
    start_time: Option<DateTime<Utc>>,
    completion_time: Option<DateTime<Utc>>,
    #[serde(default)]
    state: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    url: String,
}

impl ProwJobStatus {
    /// Elapsed whole seconds, 0 if either timestamp is missing
    fn duration(&self) -> u64 {
        match (self.start_time, self.completion_time) {
            (Some(start), Some(end)) => u64::try_from((end - start).num_seconds()).unwrap_or(0),
            _ => 0,
        }
    }
}

/// Summarise a `prowjob.json` file.
///
/// Returns `Ok(None)` for builds without a meaningful duration: `pending`,
/// `triggered` and `aborted` ones, and any state this tool does not know.
/// The `error` state counts as a failure.
///
/// # Errors
///
/// Returns an error if the file is not a Prow job document.
pub fn parse_prowjob(bytes: &[u8]) -> Result<Option<BuildResult>, serde_json::Error> {
    let prowjob: ProwJob = serde_json::from_slice(bytes)?;
    let status = match prowjob.status.state.as_str() {
        "success" => BuildStatus::Success,
        "failure" | "error" => BuildStatus::Failure,
        "pending" | "triggered" | "aborted" => return Ok(None),
        other => {
            warn!(job = %prowjob.spec.job, state = other, "Skipping build with unknown state");
            return Ok(None);
        }
    };

    let err = match status {
        BuildStatus::Success => String::new(),
        BuildStatus::Failure => prowjob.status.description.clone(),
    };

    Ok(Some(BuildResult {
        status,
        duration: prowjob.status.duration(),
        url: prowjob.status.url,
        job_name: prowjob.spec.job,
        err,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn prowjob(state: &str, start: &str, end: &str) -> String {
        format!(
            r#"{{
                "kind": "ProwJob",
                "spec": {{"type": "presubmit", "job": "pull-cert-manager-e2e-v1-24"}},
                "status": {{
                    "startTime": "{start}",
                    "pendingTime": "{start}",
                    "completionTime": "{end}",
                    "state": "{state}",
                    "description": "Job failed.",
                    "url": "https://prow.build-infra.jetstack.net/view/gs/jetstack-logs/pr-logs/pull/jetstack_cert-manager/4664/pull-cert-manager-e2e-v1-24/14356",
                    "build_id": "14356"
                }}
            }}"#
        )
    }

    #[test]
    fn test_failed_build() {
        let json = prowjob("failure", "2022-01-10T10:00:00Z", "2022-01-10T10:41:30.900Z");
        let build = parse_prowjob(json.as_bytes())
            .expect("valid prowjob")
            .expect("finished build");
        assert_eq!(build.status, BuildStatus::Failure);
        assert_eq!(build.duration, 2490);
        assert_eq!(build.job_name, "pull-cert-manager-e2e-v1-24");
        assert_eq!(build.err, "Job failed.");
        assert!(build.url.ends_with("/14356"));
    }

    #[test]
    fn test_successful_build_has_no_error() {
        let json = prowjob("success", "2022-01-10T10:00:00Z", "2022-01-10T10:00:59.999Z");
        let build = parse_prowjob(json.as_bytes())
            .expect("valid prowjob")
            .expect("finished build");
        assert!(build.succeeded());
        assert_eq!(build.duration, 59);
        assert_eq!(build.err, "");
    }

    #[test]
    fn test_error_state_is_failure() {
        let json = prowjob("error", "2022-01-10T10:00:00Z", "2022-01-10T10:00:01Z");
        let build = parse_prowjob(json.as_bytes())
            .expect("valid prowjob")
            .expect("finished build");
        assert_eq!(build.status, BuildStatus::Failure);
    }

    #[test]
    fn test_unfinished_builds_are_skipped() {
        for state in ["pending", "triggered", "aborted", "exploded"] {
            let json = prowjob(state, "2022-01-10T10:00:00Z", "2022-01-10T10:00:01Z");
            assert_eq!(parse_prowjob(json.as_bytes()).expect("valid prowjob"), None);
        }
    }

    #[test]
    fn test_missing_completion_time() {
        let json = r#"{"spec": {"job": "j"}, "status": {"state": "failure", "startTime": "2022-01-10T10:00:00Z"}}"#;
        let build = parse_prowjob(json.as_bytes())
            .expect("valid prowjob")
            .expect("finished build");
        assert_eq!(build.duration, 0);
    }

    #[test]
    fn test_invalid_json() {
        assert!(parse_prowjob(b"not json").is_err());
        assert!(parse_prowjob(b"{}").is_err());
    }

    #[test]
    fn test_json_field_names() {
        let build = BuildResult {
            status: BuildStatus::Success,
            duration: 61,
            url: "u".to_string(),
            job_name: "j".to_string(),
            err: String::new(),
        };
        let json = serde_json::to_value(&build).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "status": "success",
                "duration": 61,
                "url": "u",
                "jobName": "j",
                "err": "",
            })
        );
    }
}
