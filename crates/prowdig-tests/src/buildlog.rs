// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Whole build-log parsing: segment, parse each block, normalize

use tracing::{debug, warn};

use crate::block::parse_block;
use crate::error::TestsError;
use crate::normalize::{Provenance, normalize};
use crate::result::CanonicalResult;
use crate::segment::segment;

/// A block that could not be parsed
#[derive(Debug)]
pub struct SkippedBlock {
    /// Header line of the block
    pub start_line: usize,
    /// Why it was skipped
    pub error: TestsError,
}

/// Results recovered from one build log
#[derive(Debug, Default)]
pub struct BuildLogSummary {
    /// One result per parseable failure block, in log order
    pub results: Vec<CanonicalResult>,
    /// Blocks that failed to parse
    pub skipped: Vec<SkippedBlock>,
}

/// Parse every failure block of a build log.
///
/// A block that fails to parse is logged and skipped; the remaining blocks of
/// the file are still returned.
///
/// # Errors
///
/// Returns `TestsError::MalformedInput` if the log ends inside a block.
pub fn parse_build_log(
    text: &str,
    provenance: &Provenance,
) -> Result<BuildLogSummary, TestsError> {
    let blocks = segment(text)?;
    let mut summary = BuildLogSummary::default();

    for block in blocks {
        match parse_block(&block) {
            Ok(record) => {
                debug!(line = block.start_line, name = %record.name, "Parsed ginkgo block");
                summary
                    .results
                    .push(normalize(record, block.start_line, provenance));
            }
            Err(error) => {
                warn!(
                    source = %provenance.source_at(block.start_line),
                    error = %error,
                    "Skipping unparseable ginkgo block"
                );
                summary.skipped.push(SkippedBlock {
                    start_line: block.start_line,
                    error,
                });
            }
        }
    }

    Ok(summary)
}

/// Same as [`parse_build_log`] for raw bytes; invalid UTF-8 is replaced.
///
/// # Errors
///
/// Returns `TestsError::MalformedInput` if the log ends inside a block.
pub fn parse_build_log_bytes(
    bytes: &[u8],
    provenance: &Provenance,
) -> Result<BuildLogSummary, TestsError> {
    parse_build_log(&String::from_utf8_lossy(bytes), provenance)
}
