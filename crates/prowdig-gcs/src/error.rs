// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for prowdig-gcs

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while listing, fetching or caching objects
#[derive(Debug, Error)]
pub enum GcsError {
    /// Transport-level failure from reqwest
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status {
        /// The requested URL
        url: String,
        /// The HTTP status code
        status: u16,
    },

    /// A listing page could not be decoded
    #[error("Invalid listing: {0}")]
    Json(#[from] serde_json::Error),

    /// An object attribute in a listing had an unexpected format
    #[error("Invalid {attribute} for {name}: {value}")]
    InvalidAttribute {
        /// Object name
        name: String,
        /// Attribute name (`size` or `crc32c`)
        attribute: &'static str,
        /// The raw value
        value: String,
    },

    /// The requested object does not exist
    #[error("Object not found: {name}")]
    NotFound {
        /// Object name
        name: String,
    },

    /// Filesystem failure inside the cache directory
    #[error("Cache I/O error on {}: {source}", path.display())]
    Io {
        /// The file or directory being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl GcsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
