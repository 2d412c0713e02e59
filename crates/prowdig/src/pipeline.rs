// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Artifact pipeline: bucket to cache to canonical results
//!
//! This module downloads the artifacts of the most recent builds into the
//! local cache and turns the cached files into test results and build
//! summaries.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use prowdig::config::Config;
//! use prowdig::pipeline::{ArtifactKind, Pipeline};
//! use prowdig_gcs::GcsBucket;
//!
//! # async fn run() -> Result<(), prowdig::pipeline::PipelineError> {
//! let settings = Config::default().settings();
//! let bucket = GcsBucket::new(&settings.bucket)?;
//! let pipeline = Pipeline::new(settings).with_store(Arc::new(bucket));
//!
//! pipeline.download(20, &ArtifactKind::TEST_RESULTS).await?;
//! let (results, stats) = pipeline.collect_results(20).await?;
//! println!("{} results from {} files", results.len(), stats.files_parsed);
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use prowdig_gcs::{
    ArtifactCache, BlobStore, GcsError, SyncOutcome, list_pr_prefixes, list_recent_objects,
    public_url,
};
use prowdig_tests::{
    ArtifactPath, CanonicalResult, Provenance, TestsError, junit, normalize_junit,
    parse_build_log_bytes,
};

use crate::builds::{BuildResult, parse_prowjob};

// ============================================================================
// Error Types
// ============================================================================

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Bucket or cache error
    #[error("Storage error: {0}")]
    Gcs(#[from] GcsError),

    /// Build-log or JUnit error
    #[error("Tests error: {0}")]
    Tests(#[from] TestsError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("Fetching {url}: HTTP {status}")]
    HttpStatus {
        /// The requested URL
        url: String,
        /// The HTTP status code
        status: u16,
    },

    /// Local file error
    #[error("Reading {}: {source}", path.display())]
    Io {
        /// The file being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A download or parse task panicked or was cancelled
    #[error("Task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

// ============================================================================
// Settings
// ============================================================================

/// Everything the pipeline needs to know about where artifacts live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Bucket name
    pub bucket: String,
    /// Bucket prefixes under which PR directories are listed
    pub prefixes: Vec<String>,
    /// Local cache directory
    pub cache_dir: PathBuf,
    /// Base of the public object URLs used as result sources
    pub public_base_url: String,
    /// Maximum number of downloads in flight
    pub concurrency: usize,
}

impl Settings {
    /// Public URL of an object of the bucket
    #[must_use]
    pub fn public_url(&self, object_name: &str) -> String {
        public_url(&self.public_base_url, &self.bucket, object_name)
    }
}

// ============================================================================
// Artifact Classification
// ============================================================================

static JUNIT_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"junit__.*\.xml$").expect("valid junit regex"));
static BUILD_LOG_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"build-log\.txt$").expect("valid build log regex"));
static PROWJOB_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"prowjob\.json$").expect("valid prowjob regex"));

/// The artifacts prowdig knows how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// `junit__*.xml` report
    Junit,
    /// Ginkgo `build-log.txt`
    BuildLog,
    /// `prowjob.json` build descriptor
    ProwJob,
}

impl ArtifactKind {
    /// What the test commands read
    pub const TEST_RESULTS: [ArtifactKind; 2] = [ArtifactKind::Junit, ArtifactKind::BuildLog];

    /// What the job commands read
    pub const BUILDS: [ArtifactKind; 1] = [ArtifactKind::ProwJob];

    /// Classify an object name or path
    #[must_use]
    pub fn classify(name: &str) -> Option<Self> {
        if JUNIT_FILE.is_match(name) {
            Some(ArtifactKind::Junit)
        } else if BUILD_LOG_FILE.is_match(name) {
            Some(ArtifactKind::BuildLog)
        } else if PROWJOB_FILE.is_match(name) {
            Some(ArtifactKind::ProwJob)
        } else {
            None
        }
    }
}

// ============================================================================
// Progress Reporting
// ============================================================================

/// Progress callback signature
pub type ProgressCallback = Box<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Progress event during a pipeline stage
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Starting a stage
    Started {
        /// Stage name
        stage: &'static str,
        /// Number of items to process, if known
        total_items: Option<usize>,
    },
    /// Item processed
    Progress {
        /// Stage name
        stage: &'static str,
        /// Number of items processed so far
        processed: usize,
        /// Total number of items, if known
        total: Option<usize>,
    },
    /// Non-fatal error occurred
    Warning {
        /// Stage name
        stage: &'static str,
        /// Description of the warning
        message: String,
    },
    /// Stage completed
    Completed {
        /// Stage name
        stage: &'static str,
        /// Statistics of the stage
        stats: PipelineStats,
    },
}

// ============================================================================
// Statistics
// ============================================================================

/// Statistics from a pipeline stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Objects selected for download
    pub objects_listed: usize,
    /// Objects fetched from the bucket
    pub downloaded: usize,
    /// Objects already up to date in the cache
    pub cache_hits: usize,
    /// Cached files read successfully
    pub files_parsed: usize,
    /// Cached files skipped because they could not be read or parsed
    pub files_skipped: usize,
    /// Failure blocks skipped inside otherwise readable build logs
    pub blocks_skipped: usize,
    /// Rows produced
    pub rows: usize,
}

impl PipelineStats {
    /// Number of problems that were skipped over
    #[must_use]
    pub fn warnings(&self) -> usize {
        self.files_skipped + self.blocks_skipped
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Downloads artifacts into the cache and reads them back
pub struct Pipeline {
    settings: Settings,
    cache: ArtifactCache,
    store: Option<Arc<dyn BlobStore>>,
    progress: Option<ProgressCallback>,
}

impl Pipeline {
    /// Create an offline pipeline reading only from the cache
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        let cache = ArtifactCache::new(settings.cache_dir.clone());
        Self {
            settings,
            cache,
            store: None,
            progress: None,
        }
    }

    /// Download from `store` before reading the cache
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set a progress callback
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Report progress event
    fn report(&self, event: ProgressEvent) {
        if let Some(ref callback) = self.progress {
            callback(&event);
        }
    }

    // ========================================================================
    // Download
    // ========================================================================

    /// Mirror the artifacts of the `max_builds` most recent builds.
    ///
    /// `prowjob.json` files are mirrored along with the requested kinds, since
    /// the cache walk counts builds by them. Does nothing for an offline
    /// pipeline. Downloads run concurrently, at most `Settings::concurrency`
    /// at a time.
    ///
    /// # Errors
    ///
    /// Returns an error if listing fails or any object cannot be downloaded.
    pub async fn download(
        &self,
        max_builds: usize,
        kinds: &[ArtifactKind],
    ) -> Result<PipelineStats, PipelineError> {
        let Some(store) = &self.store else {
            debug!("No object store configured, using the cache only");
            return Ok(PipelineStats::default());
        };

        info!(
            bucket = %self.settings.bucket,
            max_builds,
            "Listing recent builds"
        );
        let pr_prefixes = list_pr_prefixes(store.as_ref(), &self.settings.prefixes).await?;
        let objects = list_recent_objects(store.as_ref(), &pr_prefixes, max_builds, |name| {
            ArtifactKind::classify(name)
                .is_some_and(|kind| kind == ArtifactKind::ProwJob || kinds.contains(&kind))
        })
        .await?;

        let total = objects.len();
        let mut stats = PipelineStats {
            objects_listed: total,
            ..Default::default()
        };
        self.report(ProgressEvent::Started {
            stage: "download",
            total_items: Some(total),
        });
        info!(objects = total, "Downloading artifacts to cache");

        let permits = Arc::new(Semaphore::new(self.settings.concurrency.max(1)));
        let mut tasks = JoinSet::new();
        for object in objects {
            let store = Arc::clone(store);
            let cache = self.cache.clone();
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                cache.sync(store.as_ref(), &object).await
            });
        }

        let mut processed = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined?? {
                SyncOutcome::Hit => stats.cache_hits += 1,
                SyncOutcome::Downloaded => stats.downloaded += 1,
            }
            processed += 1;
            if processed % 10 == 0 {
                self.report(ProgressEvent::Progress {
                    stage: "download",
                    processed,
                    total: Some(total),
                });
            }
        }

        info!(
            downloaded = stats.downloaded,
            cache_hits = stats.cache_hits,
            "Download complete"
        );
        self.report(ProgressEvent::Completed {
            stage: "download",
            stats: stats.clone(),
        });
        Ok(stats)
    }

    // ========================================================================
    // Cache Reading
    // ========================================================================

    /// Cached artifacts of the `max_builds` most recent builds
    async fn cached_artifacts(&self, max_builds: usize) -> Result<Vec<PathBuf>, PipelineError> {
        let cache = self.cache.clone();
        let prefixes = self.settings.prefixes.clone();
        let paths =
            tokio::task::spawn_blocking(move || cache.find_artifacts(&prefixes, max_builds))
                .await??;
        Ok(paths)
    }

    /// Provenance of a cached file, or `None` if its path carries no
    /// PR/job/build triple
    fn provenance(&self, path: &Path) -> Option<Provenance> {
        let object_name = self.cache.object_name(path)?;
        let artifact = ArtifactPath::parse(&object_name)?;
        Some(Provenance::Artifact {
            url: self.settings.public_url(&object_name),
            path: artifact,
        })
    }

    fn skip(&self, stage: &'static str, stats: &mut PipelineStats, message: String) {
        warn!(stage, "{message}");
        stats.files_skipped += 1;
        self.report(ProgressEvent::Warning { stage, message });
    }

    /// Test results from the cached JUnit reports and build logs.
    ///
    /// Best effort: a file that cannot be read or segmented is skipped with a
    /// warning, and so is every failure block that cannot be parsed.
    ///
    /// # Errors
    ///
    /// Returns an error only if the cache directory cannot be walked.
    pub async fn collect_results(
        &self,
        max_builds: usize,
    ) -> Result<(Vec<CanonicalResult>, PipelineStats), PipelineError> {
        let artifacts = self.cached_artifacts(max_builds).await?;
        let total = artifacts.len();
        self.report(ProgressEvent::Started {
            stage: "parse",
            total_items: Some(total),
        });
        info!(files = total, "Parsing cached artifacts");

        let mut stats = PipelineStats::default();
        let mut results = Vec::new();

        for path in &artifacts {
            let Some(kind) = path
                .to_str()
                .and_then(ArtifactKind::classify)
                .filter(|kind| ArtifactKind::TEST_RESULTS.contains(kind))
            else {
                continue;
            };
            let Some(provenance) = self.provenance(path) else {
                self.skip(
                    "parse",
                    &mut stats,
                    format!("No PR/job/build in path {}", path.display()),
                );
                continue;
            };
            let bytes = match self.cache.load(path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    self.skip("parse", &mut stats, e.to_string());
                    continue;
                }
            };

            match parse_artifact(kind, &bytes, &provenance) {
                Ok((rows, blocks_skipped)) => {
                    debug!(source = %provenance.source(), rows = rows.len(), "Parsed artifact");
                    stats.files_parsed += 1;
                    stats.blocks_skipped += blocks_skipped;
                    results.extend(rows);
                }
                Err(e) => {
                    self.skip("parse", &mut stats, format!("{}: {e}", provenance.source()));
                }
            }
        }

        stats.rows = results.len();
        info!(
            results = stats.rows,
            files = stats.files_parsed,
            warnings = stats.warnings(),
            "Parsing complete"
        );
        self.report(ProgressEvent::Completed {
            stage: "parse",
            stats: stats.clone(),
        });
        Ok((results, stats))
    }

    /// Build summaries from the cached `prowjob.json` files.
    ///
    /// Builds that are still running or were aborted are left out. Files that
    /// cannot be read or decoded are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error only if the cache directory cannot be walked.
    pub async fn collect_builds(
        &self,
        max_builds: usize,
    ) -> Result<(Vec<BuildResult>, PipelineStats), PipelineError> {
        let artifacts = self.cached_artifacts(max_builds).await?;
        let mut stats = PipelineStats::default();
        let mut builds = Vec::new();

        for path in &artifacts {
            if path.to_str().and_then(ArtifactKind::classify) != Some(ArtifactKind::ProwJob) {
                continue;
            }
            let bytes = match self.cache.load(path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    self.skip("jobs", &mut stats, e.to_string());
                    continue;
                }
            };
            match parse_prowjob(&bytes) {
                Ok(Some(build)) => builds.push(build),
                Ok(None) => debug!(path = %path.display(), "Skipping unfinished build"),
                Err(e) => {
                    self.skip("jobs", &mut stats, format!("{}: {e}", path.display()));
                    continue;
                }
            }
            stats.files_parsed += 1;
        }

        stats.rows = builds.len();
        info!(builds = stats.rows, warnings = stats.warnings(), "Read build summaries");
        Ok((builds, stats))
    }
}

/// Results of one cached file, with the number of blocks that were skipped
fn parse_artifact(
    kind: ArtifactKind,
    bytes: &[u8],
    provenance: &Provenance,
) -> Result<(Vec<CanonicalResult>, usize), TestsError> {
    match kind {
        ArtifactKind::Junit => {
            let cases = junit::ingest(bytes)?;
            let rows = cases
                .iter()
                .filter_map(|c| normalize_junit(c, provenance))
                .collect();
            Ok((rows, 0))
        }
        ArtifactKind::BuildLog => {
            let summary = parse_build_log_bytes(bytes, provenance)?;
            Ok((summary.results, summary.skipped.len()))
        }
        ArtifactKind::ProwJob => Ok((Vec::new(), 0)),
    }
}
