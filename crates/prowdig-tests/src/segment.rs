// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Build-log segmentation
//!
//! A Ginkgo v1 build log interleaves step annotations, informational prints and
//! slow-test summaries with failure reports. Each failure report looks like
//! this:
//!
//! ```text
//! • Failure [301.437 seconds]                          ^
//! [Conformance] Certificates                           |
//! test/e2e/framework/framework.go:287                  |
//!   with issuer type External ClusterIssuer            |
//!   test/e2e/suite/conformance/certificates.go:47      |
//!     should issue a cert with wildcard DNS Name [It]  |
//!     test/e2e/suite/conformance/certificates.go:105   | lines
//!                                                      |
//!     Unexpected error:                                |
//!         <*errors.errorString | 0xc0001c07b0>: {      |
//!             s: "timed out waiting for the condition",|
//!         }                                            |
//!         timed out waiting for the condition          |
//!     occurred                                         |
//!                                                      |
//!     test/e2e/suite/conformance/certificates.go:522   |
//! ------------------------------                       v
//! ```
//!
//! [`segment`] cuts these reports out of the log in a single pass and leaves
//! everything else behind.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::TestsError;

/// Prefix of a failure report header line
pub const BLOCK_START: &str = "• Failure";

/// Line that closes a failure report
pub const BLOCK_END: &str = "------------------------------";

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1B\[[0-9;]*[mGK]").expect("valid ANSI regex"));

/// One failure report cut out of a build log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    /// 1-based line number of the header line in the original log
    pub start_line: usize,
    /// Lines from the header up to and including the dash separator
    pub lines: Vec<String>,
}

/// Remove the colour escape sequences that Ginkgo prints
#[must_use]
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    ANSI_ESCAPE.replace_all(text, "")
}

/// Split a build log into failure blocks.
///
/// Colour codes are stripped first. Lines outside of a block are discarded.
///
/// # Errors
///
/// Returns `TestsError::MalformedInput` if the log ends while a block is still
/// open; no partial block is ever returned.
pub fn segment(text: &str) -> Result<Vec<RawBlock>, TestsError> {
    let text = strip_ansi(text);

    let mut blocks = Vec::new();
    let mut current: Option<RawBlock> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;

        if current.is_none() && line.starts_with(BLOCK_START) {
            current = Some(RawBlock {
                start_line: line_no,
                lines: Vec::new(),
            });
        }

        let Some(block) = current.as_mut() else {
            continue;
        };
        block.lines.push(line.to_string());

        if line == BLOCK_END
            && let Some(block) = current.take()
        {
            debug!(
                start_line = block.start_line,
                lines = block.lines.len(),
                "Found ginkgo block"
            );
            blocks.push(block);
        }
    }

    if let Some(block) = current {
        return Err(TestsError::MalformedInput {
            start_line: block.start_line,
        });
    }

    Ok(blocks)
}

/// Same as [`segment`] for raw bytes; invalid UTF-8 is replaced.
///
/// # Errors
///
/// Returns `TestsError::MalformedInput` on an unterminated block.
pub fn segment_bytes(bytes: &[u8]) -> Result<Vec<RawBlock>, TestsError> {
    segment(&String::from_utf8_lossy(bytes))
}
