// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! JUnit XML report ingestion
//!
//! Ginkgo writes one `junit__NN.xml` per parallel node. Only the `<testcase>`
//! elements matter here; suite-level attributes are ignored.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::error::TestsError;

/// Status of a JUnit test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JunitStatus {
    /// No child element
    Passed,
    /// `<skipped/>`
    Skipped,
    /// `<failure/>`
    Failed,
    /// `<error/>`
    Error,
}

/// One `<testcase>` element
#[derive(Debug, Clone, PartialEq)]
pub struct JunitCase {
    /// The `name` attribute
    pub name: String,
    /// Derived from the child elements; `<error>` wins over `<failure>`,
    /// which wins over `<skipped>`
    pub status: JunitStatus,
    /// The `time` attribute, in seconds
    pub duration_secs: f64,
}

/// Read every test case from a JUnit XML report
///
/// # Errors
///
/// Returns `TestsError::Junit` or `TestsError::JunitAttribute` if the XML is
/// malformed.
pub fn ingest(bytes: &[u8]) -> Result<Vec<JunitCase>, TestsError> {
    let text = String::from_utf8_lossy(bytes);
    let mut reader = Reader::from_str(&text);
    reader.config_mut().trim_text(true);

    let mut cases = Vec::new();
    let mut current: Option<JunitCase> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"testcase" => {
                current = Some(testcase(&e)?);
            }
            Event::Empty(e) if e.name().as_ref() == b"testcase" => {
                cases.push(testcase(&e)?);
            }
            Event::Start(e) | Event::Empty(e) => {
                if let Some(case) = current.as_mut() {
                    let status = match e.name().as_ref() {
                        b"error" => JunitStatus::Error,
                        b"failure" => JunitStatus::Failed,
                        b"skipped" => JunitStatus::Skipped,
                        _ => continue,
                    };
                    case.status = case.status.max(status);
                }
            }
            Event::End(e) if e.name().as_ref() == b"testcase" => {
                if let Some(case) = current.take() {
                    cases.push(case);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    debug!(cases = cases.len(), "Ingested junit report");
    Ok(cases)
}

fn testcase(element: &BytesStart<'_>) -> Result<JunitCase, TestsError> {
    let mut case = JunitCase {
        name: String::new(),
        status: JunitStatus::Passed,
        duration_secs: 0.0,
    };

    for attr in element.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"name" => case.name = attr.unescape_value()?.into_owned(),
            b"time" => {
                case.duration_secs = attr.unescape_value()?.trim().parse().unwrap_or(0.0);
            }
            _ => {}
        }
    }

    Ok(case)
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    const REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuites>
  <testsuite name="cert-manager e2e suite" tests="4" failures="1" errors="0" time="310.2">
    <testcase name="[cert-manager] Vault Issuer should be ready" classname="cert-manager e2e suite" time="71.567">
      <failure type="Failure">timed out waiting for the condition</failure>
    </testcase>
    <testcase name="[Conformance] Certificates should issue a basic certificate" classname="cert-manager e2e suite" time="12.9"></testcase>
    <testcase name="[cert-manager] ACME &amp; Friends should skip" classname="cert-manager e2e suite" time="0">
      <skipped></skipped>
    </testcase>
    <testcase name="[cert-manager] Fast test" classname="cert-manager e2e suite" time="0.4"/>
  </testsuite>
</testsuites>"#;

    #[test]
    fn test_ingest_statuses() {
        let cases = ingest(REPORT.as_bytes()).expect("Should parse");
        assert_eq!(cases.len(), 4);
        assert_eq!(cases[0].status, JunitStatus::Failed);
        assert_eq!(cases[0].duration_secs, 71.567);
        assert_eq!(cases[1].status, JunitStatus::Passed);
        assert_eq!(cases[2].name, "[cert-manager] ACME & Friends should skip");
        assert_eq!(cases[2].status, JunitStatus::Skipped);
        assert_eq!(cases[3].status, JunitStatus::Passed);
        assert_eq!(cases[3].duration_secs, 0.4);
    }

    #[test]
    fn test_error_wins_over_failure() {
        let xml = r#"<testsuite><testcase name="t" time="1"><failure/><error/></testcase></testsuite>"#;
        let cases = ingest(xml.as_bytes()).expect("Should parse");
        assert_eq!(cases[0].status, JunitStatus::Error);
    }

    #[test]
    fn test_empty_report() {
        let cases = ingest(b"<testsuites></testsuites>").expect("Should parse");
        assert!(cases.is_empty());
    }

    #[test]
    fn test_malformed_report() {
        let result = ingest(b"<testsuite><testcase name=\"t\"></testsuite>");
        assert!(result.is_err());
    }
}
