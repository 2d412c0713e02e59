// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for build-log parsing
//!
//! This fuzzes segmentation and block parsing on arbitrary bytes, including
//! invalid UTF-8 and stray ANSI escapes.

#![no_main]

use libfuzzer_sys::fuzz_target;

use prowdig_tests::{Provenance, parse_block, parse_build_log_bytes, segment};

fuzz_target!(|data: &[u8]| {
    // Whole-log parsing should never panic
    let _ = parse_build_log_bytes(data, &Provenance::File("fuzz.txt".to_string()));

    // Every block must be parseable or rejected, never a panic
    let text = String::from_utf8_lossy(data);
    if let Ok(blocks) = segment(&text) {
        for block in &blocks {
            let _ = parse_block(block);
        }
    }
});
