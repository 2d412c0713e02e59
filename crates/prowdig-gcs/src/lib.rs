// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! prowdig-gcs: Prow log bucket access for prowdig
//!
//! This library crate lists and downloads CI artifacts from a public Google
//! Cloud Storage bucket and mirrors them into a local cache keyed by CRC32C.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use prowdig_gcs::{ArtifactCache, GcsBucket, list_pr_prefixes, list_recent_objects};
//!
//! # async fn run() -> Result<(), prowdig_gcs::GcsError> {
//! let bucket = GcsBucket::new("jetstack-logs")?;
//! let cache = ArtifactCache::new("/tmp/prowdig");
//!
//! let prefixes = vec!["pr-logs/pull/jetstack_cert-manager".to_string()];
//! let pr_prefixes = list_pr_prefixes(&bucket, &prefixes).await?;
//! for object in list_recent_objects(&bucket, &pr_prefixes, 10, |_| true).await? {
//!     cache.sync(&bucket, &object).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod error;
pub mod gcs;
pub mod memory;
pub mod object;
pub mod store;

pub use cache::{ArtifactCache, SyncOutcome};
pub use error::GcsError;
pub use gcs::{DEFAULT_ENDPOINT, GcsBucket};
pub use memory::MemoryStore;
pub use object::{ObjectMeta, checksum, pr_number, public_url, sort_numeric_desc};
pub use store::{BlobStore, ListPage, ListQuery, list_pr_prefixes, list_recent_objects};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::{ArtifactCache, SyncOutcome};
    pub use crate::error::GcsError;
    pub use crate::object::ObjectMeta;
    pub use crate::store::{BlobStore, list_pr_prefixes, list_recent_objects};
}
