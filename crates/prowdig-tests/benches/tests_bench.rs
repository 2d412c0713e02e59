// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use prowdig_tests::{Provenance, parse_build_log, segment, stats};

const BLOCK: &str = "\
• Failure [301.574 seconds]
[Conformance] Certificates
test/e2e/framework/framework.go:287
  with issuer type SelfSigned ClusterIssuer
  test/e2e/suite/conformance/tests.go:47
    should issue a certificate for a single distinct DNS Name [It]
    test/e2e/suite/conformance/suite.go:105

    Unexpected error:
        <*errors.errorString | 0xc0001c07d0>: {
            s: \"timed out waiting for the condition\",
        }
        timed out waiting for the condition
    occurred

    test/e2e/suite/conformance/tests.go:149
------------------------------
";

/// A log with `blocks` failures separated by passing-spec noise
fn synthetic_log(blocks: usize) -> String {
    let mut log = String::new();
    for i in 0..blocks {
        for _ in 0..50 {
            log.push_str("\u{1b}[32m•\u{1b}[0m I1010 12:00:00.000000 framework.go:287] waiting\n");
        }
        log.push_str(&BLOCK.replace("single distinct", &format!("distinct #{}", i % 40)));
    }
    log
}

fn segment_benchmark(c: &mut Criterion) {
    let log = synthetic_log(200);
    c.bench_function("segment_200_blocks", |b| {
        b.iter(|| segment(black_box(&log)))
    });
}

fn parse_benchmark(c: &mut Criterion) {
    let log = synthetic_log(200);
    let provenance = Provenance::File("build-log.txt".to_string());
    c.bench_function("parse_build_log_200_blocks", |b| {
        b.iter(|| parse_build_log(black_box(&log), &provenance))
    });
}

fn stats_benchmark(c: &mut Criterion) {
    let log = synthetic_log(2000);
    let results = parse_build_log(&log, &Provenance::File("build-log.txt".to_string()))
        .expect("synthetic log parses")
        .results;
    c.bench_function("max_duration_2000_results", |b| {
        b.iter(|| stats::max_duration(black_box(&results)))
    });
    c.bench_function("most_failures_2000_results", |b| {
        b.iter(|| stats::most_failures(black_box(&results)))
    });
}

criterion_group!(benches, segment_benchmark, parse_benchmark, stats_benchmark);
criterion_main!(benches);
