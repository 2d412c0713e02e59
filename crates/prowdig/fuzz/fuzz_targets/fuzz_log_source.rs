// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

#![no_main]

//! Fuzz target for `tests parse-logs` argument handling

use libfuzzer_sys::fuzz_target;

use prowdig::fetch::LogSource;

fuzz_target!(|data: &[u8]| {
    if let Ok(arg) = std::str::from_utf8(data) {
        let source = LogSource::parse(arg);
        let provenance = source.provenance();
        let _ = provenance.source_at(1);
    }
});
