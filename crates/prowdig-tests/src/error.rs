// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for prowdig-tests

use thiserror::Error;

/// Errors that can occur while turning CI artifacts into test results
#[derive(Debug, Error)]
pub enum TestsError {
    /// A failure block was opened but the input ended before its separator line
    #[error(
        "unexpected end of file, still waiting for the ginkgo block started at line {start_line} to end with '------------------------------'"
    )]
    MalformedInput {
        /// 1-based line number of the unterminated block's header
        start_line: usize,
    },

    /// A block needs at least a header and a footer line
    #[error("a ginkgo block is at least 2 lines long, got: {block}")]
    BlockTooShort {
        /// The offending block, newline-joined
        block: String,
    },

    /// The first line of a block is not a failure header
    #[error("ginkgo block header: expected 'Failure' or 'Failure in Spec Setup', got: {line}")]
    InvalidHeader {
        /// The header line as found
        line: String,
    },

    /// The duration digits in the header do not fit an integer
    #[error("ginkgo block header: expected an integer duration, got: {digits}")]
    InvalidDuration {
        /// The captured digits
        digits: String,
    },

    /// The last line of a block is not the dash separator
    #[error("expected the last line to be '------------------------------', block was: {block}")]
    MissingFooter {
        /// The offending block, newline-joined
        block: String,
    },

    /// The block has no description/location pair to build a name from
    #[error("no name line found, remaining was: {remaining}")]
    NoNameLine {
        /// The block body after header and footer were removed
        remaining: String,
    },

    /// Error reading a JUnit XML report
    #[error("failed to ingest junit XML: {0}")]
    Junit(#[from] quick_xml::Error),

    /// Invalid attribute in a JUnit XML report
    #[error("failed to ingest junit XML: {0}")]
    JunitAttribute(#[from] quick_xml::events::attributes::AttrError),
}

impl TestsError {
    /// Whether this error came from parsing a single block.
    ///
    /// Block parse errors only invalidate that one block; callers may skip it
    /// and keep the rest of the file.
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::BlockTooShort { .. }
                | Self::InvalidHeader { .. }
                | Self::InvalidDuration { .. }
                | Self::MissingFooter { .. }
                | Self::NoNameLine { .. }
        )
    }
}
