// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Ginkgo failure block parsing
//!
//! A block produced by [`crate::segment`] is parsed in stages:
//!
//! ```text
//! • Failure [301.574 seconds]                          <- Header
//! [Conformance] Certificates                            ^
//! test/e2e/framework/framework.go:287                   |
//!   with issuer type SelfSigned ClusterIssuer           | Name
//!   test/e2e/suite/conformance/tests.go:47              |
//!     should issue an ECDSA, defaulted cert [It]        |
//!     test/e2e/suite/conformance/suite.go:105           v
//!                                                                 ^
//!     Unexpected error:                                 ^         |
//!         <*errors.errorString | 0xc0001c07d0>: {       |         |
//!             s: "timed out waiting for the condition", | Err     |
//!         }                                             |         | optional
//!         timed out waiting for the condition           |         |
//!     occurred                                          v         |
//!                                                                 |
//!     test/e2e/suite/conformance/tests.go:149          <- ErrLoc  v
//! ------------------------------                       <- Footer
//! ```
//!
//! The `[It]` suffix is removed from names so that they match the test names
//! found in `junit__*.xml` reports.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::TestsError;
use crate::result::{Outcome, ParsedRecord};
use crate::segment::{BLOCK_END, RawBlock};

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"• (Failure|Failure in Spec Setup.*) \[(\d+)\.\d+ ").expect("valid header regex")
});

const IT_MARKER: &str = " [It]";
const UNEXPECTED_ERROR: &str = "Unexpected error:";
const DUMP_INDENT: &str = "    ";

/// Parse one failure block into a record.
///
/// # Errors
///
/// Returns a parse error (see [`TestsError::is_parse_error`]) when the header,
/// the footer or the name hierarchy is missing or malformed.
pub fn parse_block(block: &RawBlock) -> Result<ParsedRecord, TestsError> {
    let lines: Vec<&str> = block.lines.iter().map(String::as_str).collect();
    if lines.len() < 2 {
        return Err(TestsError::BlockTooShort {
            block: lines.join("\n"),
        });
    }

    let (outcome, duration_secs) = parse_header(lines[0])?;

    if lines[lines.len() - 1] != BLOCK_END {
        return Err(TestsError::MissingFooter {
            block: lines.join("\n"),
        });
    }
    let body = &lines[1..lines.len() - 1];

    let (name, consumed) = parse_name(body)?;

    let mut record = ParsedRecord {
        name,
        outcome,
        duration_secs,
        error_message: None,
        error_location: None,
    };

    if consumed < body.len() {
        // Each name level is two lines indented two spaces deeper than its
        // parent, so the error shares the indentation of the last level.
        let indent = consumed - 2;
        if let Some((message, location)) = parse_error_section(&body[consumed..], indent) {
            record.error_message = message;
            record.error_location = Some(location);
        }
    }

    Ok(record)
}

/// Extract the outcome and truncated duration from a header line
fn parse_header(line: &str) -> Result<(Outcome, u64), TestsError> {
    let caps = HEADER
        .captures(line)
        .ok_or_else(|| TestsError::InvalidHeader {
            line: line.to_string(),
        })?;

    let kind = &caps[1];
    let outcome = if kind.starts_with("Failure in Spec Setup") {
        Outcome::SetupError
    } else if kind == "Failure" {
        Outcome::Failed
    } else {
        return Err(TestsError::InvalidHeader {
            line: line.to_string(),
        });
    };

    let digits = &caps[2];
    let duration = digits
        .parse::<u64>()
        .map_err(|_| TestsError::InvalidDuration {
            digits: digits.to_string(),
        })?;

    Ok((outcome, duration))
}

/// Walk the description/location pairs and return the joined name together
/// with the number of lines consumed.
fn parse_name(body: &[&str]) -> Result<(String, usize), TestsError> {
    let mut parts = Vec::new();
    let mut i = 0;
    while i + 1 < body.len()
        && leading_spaces(body[i]) >= i
        && leading_spaces(body[i + 1]) >= i
    {
        let description = body[i].strip_suffix(IT_MARKER).unwrap_or(body[i]);
        parts.push(strip_indent(description, i));
        i += 2;
    }

    let name = parts.join(" ");
    if i == 0 || name.trim().is_empty() {
        return Err(TestsError::NoNameLine {
            remaining: body.join("\n"),
        });
    }

    Ok((name, i))
}

/// Split the trailing error section into the message and its location.
///
/// Returns `None` when nothing but blank padding is left.
fn parse_error_section(section: &[&str], indent: usize) -> Option<(Option<String>, String)> {
    let section = match section.first() {
        Some(first) if first.is_empty() => &section[1..],
        _ => section,
    };

    let lines: Vec<&str> = section.iter().map(|l| strip_indent(l, indent)).collect();
    let (location, _) = lines.split_last()?;

    // The location is always preceded by exactly one blank line.
    let body = &lines[..lines.len().saturating_sub(2)];
    let message = error_message(body);

    Some((message, (*location).to_string()))
}

/// Turn the error body into a message, unwrapping a Gomega
/// `Unexpected error: <dump> occurred` wrapper when present.
fn error_message(body: &[&str]) -> Option<String> {
    if body.is_empty() {
        return None;
    }

    let Some(marker) = body.iter().position(|l| *l == UNEXPECTED_ERROR) else {
        return Some(body.join("\n"));
    };

    let mut parts: Vec<&str> = body[..marker]
        .iter()
        .copied()
        .filter(|l| !l.trim().is_empty())
        .collect();
    parts.extend(unwrap_dump(&body[marker..]));

    Some(parts.join("\n"))
}

/// Keep only the plain error string from a block of the form
///
/// ```text
/// Unexpected error:
///     <*errors.errorString | 0xc0001c07d0>: {
///         s: "timed out waiting for the condition",
///     }
///     timed out waiting for the condition
/// occurred
/// ```
///
/// Without a line ending in `}` the wrapper is kept as is, minus the dump
/// indentation.
fn unwrap_dump<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let kept = match lines.iter().position(|l| l.ends_with('}')) {
        Some(close) => {
            // The last line is the `occurred` keyword.
            let end = lines.len().saturating_sub(1);
            &lines[(close + 1).min(end)..end]
        }
        None => lines,
    };

    kept.iter()
        .map(|l| l.strip_prefix(DUMP_INDENT).unwrap_or(l))
        .collect()
}

fn leading_spaces(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b' ').count()
}

/// Remove up to `n` leading spaces
fn strip_indent(line: &str, n: usize) -> &str {
    &line[leading_spaces(line).min(n)..]
}
