// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! prowdig: dig through Prow CI logs for flaky and slow Ginkgo tests
//!
//! This binary crate mirrors the recent build artifacts of a Prow log bucket
//! into a local cache and reports on the test results found in them.

use std::io::{IsTerminal, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use prowdig::commands;
use prowdig::config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Logs go to stderr, stdout only carries the report
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    if let Err(e) = config.validate() {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    let term = std::env::var("TERM").ok();
    let color = config
        .color
        .enabled(std::io::stdout().is_terminal(), term.as_deref());
    colored::control::set_override(color);
    debug!(color, cache_dir = %config.cache_dir().display(), "Starting prowdig");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = commands::run(&config, &mut out).await;
    let flushed = out.flush();

    match result.and(flushed.map_err(Into::into)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
