// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Ranked statistics over canonical results
//!
//! Both reports are ordered "worst last", so that the most interesting rows
//! end up right above the shell prompt.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::result::{CanonicalResult, Status};

/// Longest passed run vs. longest failed run of one test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxDurationStat {
    /// Test name
    pub name: String,
    /// In seconds
    #[serde(rename = "maxDurationPassed")]
    pub max_passed_secs: u64,
    /// In seconds
    #[serde(rename = "maxDurationFailed")]
    pub max_failed_secs: u64,
}

impl MaxDurationStat {
    /// How much longer the slowest failure took than the slowest pass
    #[must_use]
    pub fn margin(&self) -> i128 {
        i128::from(self.max_failed_secs) - i128::from(self.max_passed_secs)
    }
}

/// Pass and failure counts of one test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureCountStat {
    /// Test name
    pub name: String,
    /// Number of passed runs
    pub count_passed: usize,
    /// Number of failed runs
    pub count_failed: usize,
    /// Failed runs in input order
    pub failures: Vec<CanonicalResult>,
}

impl FailureCountStat {
    /// The most recent failure, used as a representative sample
    #[must_use]
    pub fn last_failure(&self) -> Option<&CanonicalResult> {
        self.failures.last()
    }
}

/// Group results by name, keeping groups in first-seen order
fn group_by_name<'a, T>(
    results: impl IntoIterator<Item = &'a CanonicalResult>,
    mut init: impl FnMut(&'a CanonicalResult) -> T,
    mut update: impl FnMut(&mut T, &'a CanonicalResult),
) -> Vec<T> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<T> = Vec::new();

    for result in results {
        let idx = *index.entry(result.name.as_str()).or_insert_with(|| {
            groups.push(init(result));
            groups.len() - 1
        });
        update(&mut groups[idx], result);
    }

    groups
}

/// Max passed vs. max failed duration per test name.
///
/// Tests that never failed are dropped: without a failure nothing can be said
/// about their timeout. Sorted by ascending `failed - passed`, so that tests
/// failing barely slower than they pass come first; ties keep first-seen
/// order.
#[must_use]
pub fn max_duration(results: &[CanonicalResult]) -> Vec<MaxDurationStat> {
    let mut stats = group_by_name(
        results,
        |r| MaxDurationStat {
            name: r.name.clone(),
            max_passed_secs: 0,
            max_failed_secs: 0,
        },
        |stat, r| match r.status {
            Status::Passed => stat.max_passed_secs = stat.max_passed_secs.max(r.duration_secs),
            Status::Failed => stat.max_failed_secs = stat.max_failed_secs.max(r.duration_secs),
            Status::Error => {}
        },
    );

    stats.retain(|s| s.max_failed_secs > 0);
    stats.sort_by_key(MaxDurationStat::margin);
    stats
}

/// Passed and failed counts per test name.
///
/// Setup errors are a different failure category and are not counted. Tests
/// without failures are dropped. Sorted by ascending failure count, ties keep
/// first-seen order.
#[must_use]
pub fn most_failures(results: &[CanonicalResult]) -> Vec<FailureCountStat> {
    let mut stats = group_by_name(
        results.iter().filter(|r| r.status != Status::Error),
        |r| FailureCountStat {
            name: r.name.clone(),
            count_passed: 0,
            count_failed: 0,
            failures: Vec::new(),
        },
        |stat, r| {
            if r.passed() {
                stat.count_passed += 1;
            } else {
                stat.count_failed += 1;
                stat.failures.push(r.clone());
            }
        },
    );

    stats.retain(|s| s.count_failed > 0);
    stats.sort_by_key(|s| s.count_failed);
    stats
}
