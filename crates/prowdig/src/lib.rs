// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! prowdig library
//!
//! This module exports the commands, the artifact pipeline and the report
//! renderers of prowdig for use in integration tests and as a library.

pub mod builds;
pub mod commands;
pub mod config;
pub mod fetch;
pub mod pipeline;
pub mod report;
