// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for JUnit report ingestion

#![no_main]

use libfuzzer_sys::fuzz_target;

use prowdig_tests::junit;

fuzz_target!(|data: &[u8]| {
    // Malformed XML must come back as an error
    let _ = junit::ingest(data);
});
