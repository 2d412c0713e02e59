// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Command-line configuration for prowdig
//!
//! This module provides the clap definitions for the commands and the global
//! flags, and turns them into the explicit [`Settings`] used by the pipeline.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::pipeline::Settings;

/// Default bucket holding the Prow logs
pub const DEFAULT_BUCKET: &str = "jetstack-logs";

/// Default bucket prefixes, one per repository whose PRs are scanned
pub const DEFAULT_PREFIXES: [&str; 2] = [
    "pr-logs/pull/jetstack_cert-manager",
    "pr-logs/pull/cert-manager_cert-manager",
];

/// Default number of concurrent downloads
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Dig through Prow CI logs for flaky and slow Ginkgo tests
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "prowdig")]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Config {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Only use the local cache, do not download anything from the bucket
    #[arg(long, global = true, default_value = "false")]
    pub no_download: bool,

    /// When to colour the output
    #[arg(long, global = true, value_enum, default_value_t)]
    pub color: ColorMode,

    /// Directory holding downloaded artifacts
    ///
    /// Defaults to <platform cache dir>/prowdig/<bucket>.
    #[arg(long, global = true, env = "PROWDIG_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// GCS bucket holding the Prow logs
    #[arg(long, global = true, env = "PROWDIG_BUCKET")]
    pub bucket: Option<String>,

    /// Bucket prefix under which PR directories are listed (repeatable)
    #[arg(long = "prefix", global = true)]
    pub prefixes: Vec<String>,

    /// Maximum number of downloads in flight
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so that stdout only carries the report.
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Everything related to individual test cases
    Tests {
        #[command(flatten)]
        output: OutputArgs,

        #[command(subcommand)]
        command: TestsCommand,
    },

    /// Everything related to jobs
    Jobs {
        #[command(flatten)]
        output: OutputArgs,

        #[command(subcommand)]
        command: JobsCommand,
    },
}

/// `tests` subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TestsCommand {
    /// Parse the Ginkgo failure blocks of a given file or URL
    ParseLogs {
        /// Log file or http(s) URL to parse
        file_or_url: String,
    },

    /// List all test results ordered by name
    List {
        #[command(flatten)]
        limit: LimitArgs,

        /// Only list tests whose name contains the given string
        #[arg(long)]
        name: Option<String>,

        /// Hide tests that have the status 'passed' or 'error'
        #[arg(long, default_value = "false")]
        only_failed: bool,
    },

    /// Compare the longest passed and the longest failed run of each test
    ///
    /// Tests whose failures take barely longer than their passes come first.
    MaxDuration {
        #[command(flatten)]
        limit: LimitArgs,
    },

    /// List the tests that fail the most
    ///
    /// Shows the count of passed and failed runs followed by the last error
    /// message, in ascending order of failures.
    MostFailures {
        #[command(flatten)]
        limit: LimitArgs,
    },
}

/// `jobs` subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum JobsCommand {
    /// List the builds of all jobs
    List {
        #[command(flatten)]
        limit: LimitArgs,
    },
}

/// The `--output` flag shared by `tests` and `jobs`
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t)]
    pub output: OutputFormat,
}

/// The `--limit` flag of the bucket-backed commands
#[derive(Args, Debug, Clone, Copy)]
pub struct LimitArgs {
    /// Number of most recent builds to fetch from the bucket
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

/// Report format
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One tab-separated line per row
    #[default]
    Text,
    /// A single JSON array
    Json,
}

/// Colour behaviour
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Colour when stdout is a terminal and TERM is not "dumb"
    #[default]
    Auto,
    /// Never colour
    Never,
    /// Always colour
    Always,
}

impl ColorMode {
    /// Whether colour should be emitted
    #[must_use]
    pub fn enabled(self, stdout_is_terminal: bool, term: Option<&str>) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => stdout_is_terminal && term != Some("dumb"),
        }
    }
}

impl Command {
    /// The `--limit` of the command, if it reads from the bucket
    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        match self {
            Command::Tests { command, .. } => match command {
                TestsCommand::ParseLogs { .. } => None,
                TestsCommand::List { limit, .. }
                | TestsCommand::MaxDuration { limit }
                | TestsCommand::MostFailures { limit } => Some(limit.limit),
            },
            Command::Jobs {
                command: JobsCommand::List { limit },
                ..
            } => Some(limit.limit),
        }
    }
}

impl Config {
    /// Get the bucket name, using the default if not specified
    #[must_use]
    pub fn bucket(&self) -> String {
        self.bucket
            .clone()
            .unwrap_or_else(|| DEFAULT_BUCKET.to_string())
    }

    /// Get the bucket prefixes, using the defaults if none were given
    #[must_use]
    pub fn prefixes(&self) -> Vec<String> {
        if self.prefixes.is_empty() {
            DEFAULT_PREFIXES.iter().map(ToString::to_string).collect()
        } else {
            self.prefixes.clone()
        }
    }

    /// Get the cache directory, using a default if not specified
    ///
    /// Default location is platform-specific:
    /// - macOS: ~/Library/Caches/prowdig/<bucket>
    /// - Linux: ~/.cache/prowdig/<bucket>
    /// - Windows: %LOCALAPPDATA%\prowdig\<bucket>
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("prowdig")
                .join(self.bucket())
        })
    }

    /// Get the download concurrency, using the default if not specified
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency.unwrap_or(DEFAULT_CONCURRENCY)
    }

    /// Build the pipeline settings
    #[must_use]
    pub fn settings(&self) -> Settings {
        Settings {
            bucket: self.bucket(),
            prefixes: self.prefixes(),
            cache_dir: self.cache_dir(),
            public_base_url: prowdig_gcs::DEFAULT_ENDPOINT.to_string(),
            concurrency: self.concurrency(),
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The bucket name or a prefix is empty
    /// - The concurrency is zero
    /// - The `--limit` of the command is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket().trim().is_empty() {
            return Err(ConfigError::EmptyBucket);
        }
        if self.prefixes().iter().any(|p| p.trim_matches('/').is_empty()) {
            return Err(ConfigError::EmptyPrefix);
        }
        if self.concurrency() == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if let Some(command) = &self.command
            && command.limit() == Some(0)
        {
            return Err(ConfigError::ZeroLimit);
        }
        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Empty bucket name
    #[error("Bucket name must not be empty")]
    EmptyBucket,

    /// Empty bucket prefix
    #[error("Bucket prefixes must not be empty")]
    EmptyPrefix,

    /// Zero concurrency
    #[error("Concurrency must be at least 1")]
    ZeroConcurrency,

    /// Zero limit
    #[error("Limit must be at least 1")]
    ZeroLimit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.command.is_none());
        assert!(config.cache_dir.is_none());
        assert!(!config.no_download);
        assert!(!config.verbose);
        assert!(!config.quiet);
        assert_eq!(config.color, ColorMode::Auto);
    }

    #[test]
    fn test_defaults_are_filled_in() {
        let config = Config::default();
        assert_eq!(config.bucket(), "jetstack-logs");
        assert_eq!(
            config.prefixes(),
            vec![
                "pr-logs/pull/jetstack_cert-manager",
                "pr-logs/pull/cert-manager_cert-manager",
            ]
        );
        assert_eq!(config.concurrency(), 8);
    }

    #[test]
    fn test_cache_dir_default() {
        let config = Config::default();
        let path = config.cache_dir();
        assert!(path.ends_with("prowdig/jetstack-logs"));
    }

    #[test]
    fn test_cache_dir_custom() {
        let custom = PathBuf::from("/custom/cache");
        let config = Config {
            cache_dir: Some(custom.clone()),
            ..Default::default()
        };
        assert_eq!(config.cache_dir(), custom);
        assert_eq!(config.settings().cache_dir, custom);
    }

    #[test]
    fn test_log_level_default() {
        let config = Config::default();
        assert_eq!(config.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_log_level_verbose() {
        let config = Config {
            verbose: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_log_level_quiet() {
        let config = Config {
            quiet: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_validate_rejects_empty_prefix() {
        let config = Config {
            prefixes: vec!["pr-logs/pull/a".to_string(), "/".to_string()],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyPrefix)));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = Config {
            concurrency: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroConcurrency)
        ));
    }

    #[test]
    fn test_validate_default_is_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_color_mode() {
        assert!(ColorMode::Always.enabled(false, Some("dumb")));
        assert!(!ColorMode::Never.enabled(true, Some("xterm")));
        assert!(ColorMode::Auto.enabled(true, Some("xterm-256color")));
        assert!(ColorMode::Auto.enabled(true, None));
        assert!(!ColorMode::Auto.enabled(true, Some("dumb")));
        assert!(!ColorMode::Auto.enabled(false, Some("xterm")));
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }
}
