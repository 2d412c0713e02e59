// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Object metadata and PR-prefix ordering
//!
//! Prow uploads the artifacts of a pull-request build under
//!
//! ```text
//! pr-logs/pull/jetstack_cert-manager/4664/pull-cert-manager-e2e-v1-13/14356/build-log.txt
//! <------------ bucket prefix ------> <--> <-------- job name -------> <--->
//!                                      PR                              build
//! ```

use std::cmp::Reverse;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static ENDS_WITH_PR_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d+)/?$").expect("valid PR number regex"));

/// File name that marks one build of one job
pub const PROWJOB_FILE: &str = "prowjob.json";

/// Listing attributes of one stored object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Full object name, `/`-separated
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// CRC32C (Castagnoli) of the content
    pub crc32c: u32,
}

impl ObjectMeta {
    /// Build metadata for in-memory content
    #[must_use]
    pub fn for_content(name: impl Into<String>, content: &[u8]) -> Self {
        Self {
            name: name.into(),
            size: content.len() as u64,
            crc32c: checksum(content),
        }
    }

    /// Whether this object is the job descriptor of a build
    #[must_use]
    pub fn is_prowjob(&self) -> bool {
        self.name.ends_with(PROWJOB_FILE)
    }
}

/// CRC32C of a byte slice, as reported by GCS
#[must_use]
pub fn checksum(bytes: &[u8]) -> u32 {
    crc32c::crc32c(bytes)
}

/// The PR number a prefix ends with, ignoring a trailing `/`
#[must_use]
pub fn pr_number(prefix: &str) -> Option<u64> {
    ENDS_WITH_PR_NUMBER
        .captures(prefix)
        .and_then(|caps| caps[1].parse().ok())
}

/// Sort prefixes by PR number, highest first.
///
/// A lexical sort would put `.../2/` between `.../20/` and `.../10/`. Prefixes
/// without a PR number go last, in their original order.
pub fn sort_numeric_desc<S: AsRef<str>>(prefixes: &mut [S]) {
    prefixes.sort_by_key(|p| Reverse(pr_number(p.as_ref())));
}

/// Public download URL of an object
#[must_use]
pub fn public_url(base: &str, bucket: &str, name: &str) -> String {
    format!("{}/{bucket}/{name}", base.trim_end_matches('/'))
}
