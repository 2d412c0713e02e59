// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! prowdig-tests: Ginkgo build-log parsing and test result aggregation
//!
//! This library crate recovers individual test outcomes from Ginkgo v1 build
//! logs and JUnit reports, and ranks them for the prowdig reports.
//!
//! # Example
//!
//! ```no_run
//! use prowdig_tests::{Provenance, parse_build_log, stats};
//!
//! let log = std::fs::read_to_string("build-log.txt").unwrap();
//! let summary = parse_build_log(&log, &Provenance::File("build-log.txt".into())).unwrap();
//!
//! for stat in stats::most_failures(&summary.results) {
//!     println!("{} failed {} times", stat.name, stat.count_failed);
//! }
//! ```

pub mod block;
pub mod buildlog;
pub mod error;
pub mod junit;
pub mod normalize;
pub mod result;
pub mod segment;
pub mod stats;

pub use block::parse_block;
pub use buildlog::{BuildLogSummary, SkippedBlock, parse_build_log, parse_build_log_bytes};
pub use error::TestsError;
pub use junit::{JunitCase, JunitStatus};
pub use normalize::{ArtifactPath, Provenance, normalize, normalize_junit};
pub use result::{CanonicalResult, Outcome, ParsedRecord, Status};
pub use segment::{RawBlock, segment, strip_ansi};
pub use stats::{FailureCountStat, MaxDurationStat};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::TestsError;
    pub use crate::normalize::Provenance;
    pub use crate::result::{CanonicalResult, Status};
    pub use crate::stats::{max_duration, most_failures};
    pub use crate::{parse_build_log, segment};
}
