// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

#![no_main]

//! Fuzz target for prowjob.json decoding
//!
//! Arbitrary bytes must never panic, and a decoded build must render.

use libfuzzer_sys::fuzz_target;

use prowdig::builds::parse_prowjob;
use prowdig::config::OutputFormat;
use prowdig::report::render_builds;

fuzz_target!(|data: &[u8]| {
    if let Ok(Some(build)) = parse_prowjob(data) {
        let mut out = Vec::new();
        let _ = render_builds(&mut out, OutputFormat::Text, std::slice::from_ref(&build));
        let _ = render_builds(&mut out, OutputFormat::Json, std::slice::from_ref(&build));
    }
});
