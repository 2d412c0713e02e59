// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Local artifact cache
//!
//! Objects are stored under `<root>/<object name>`, mirroring the bucket
//! layout. A cached file is valid as long as its CRC32C matches the listing.

use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::GcsError;
use crate::object::{ObjectMeta, PROWJOB_FILE, checksum};
use crate::store::BlobStore;

/// What [`ArtifactCache::sync`] had to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The cached copy was up to date
    Hit,
    /// The object was fetched and written
    Downloaded,
}

/// A directory mirroring part of a bucket
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    root: PathBuf,
}

impl ArtifactCache {
    /// Use `root` as the cache directory; it is created on first write
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Local path of an object
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        name.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part))
    }

    /// Object name of a cached file, the inverse of [`Self::path_for`]
    #[must_use]
    pub fn object_name(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Option<Vec<&str>> = relative.iter().map(|p| p.to_str()).collect();
        Some(parts?.join("/"))
    }

    /// Read a cached file; no checksum is verified
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn load(&self, path: &Path) -> Result<Vec<u8>, GcsError> {
        tokio::fs::read(path)
            .await
            .map_err(|e| GcsError::io(path, e))
    }

    /// Write an object into the cache, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns an error if the directories or the file cannot be written.
    pub async fn store(&self, name: &str, content: &[u8]) -> Result<PathBuf, GcsError> {
        let path = self.path_for(name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| GcsError::io(parent, e))?;
        }
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| GcsError::io(&path, e))?;
        Ok(path)
    }

    /// Whether the cached copy of `meta` exists and has the listed checksum
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read.
    pub async fn is_fresh(&self, meta: &ObjectMeta) -> Result<bool, GcsError> {
        let path = self.path_for(&meta.name);
        match tokio::fs::read(&path).await {
            Ok(content) => Ok(checksum(&content) == meta.crc32c),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(GcsError::io(path, e)),
        }
    }

    /// Make sure the cache holds the listed version of an object.
    ///
    /// A stale copy (checksum mismatch) is reported and replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the object cannot be fetched or written.
    pub async fn sync(
        &self,
        store: &dyn BlobStore,
        meta: &ObjectMeta,
    ) -> Result<SyncOutcome, GcsError> {
        let path = self.path_for(&meta.name);
        if path.exists() {
            if self.is_fresh(meta).await? {
                debug!(name = %meta.name, "Cache hit");
                return Ok(SyncOutcome::Hit);
            }
            warn!(
                path = %path.display(),
                "Checksum of cached file does not match, downloading again"
            );
        }

        let content = store.fetch(&meta.name).await?;
        self.store(&meta.name, &content).await?;
        debug!(name = %meta.name, bytes = content.len(), "Downloaded to cache");
        Ok(SyncOutcome::Downloaded)
    }

    /// Cached files of the most recent builds, without network access.
    ///
    /// PR directories under every bucket prefix are visited highest PR number
    /// first, and each one is walked recursively in lexical order. The walk
    /// stops right after the `max_builds`-th `prowjob.json`. Bucket prefixes
    /// that were never downloaded are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be read.
    pub fn find_artifacts(
        &self,
        bucket_prefixes: &[String],
        max_builds: usize,
    ) -> Result<Vec<PathBuf>, GcsError> {
        let mut pr_dirs = Vec::new();
        for prefix in bucket_prefixes {
            let dir = self.path_for(prefix);
            if !dir.is_dir() {
                debug!(dir = %dir.display(), "Prefix not in cache");
                continue;
            }
            for entry in read_dir_sorted(&dir)? {
                if entry.is_dir() {
                    pr_dirs.push(entry);
                }
            }
        }
        // Highest PR first; stable, so equal numbers keep prefix order.
        pr_dirs.sort_by_key(|dir| Reverse(dir_pr_number(dir)));

        let mut walk = Walk {
            max_builds,
            builds: 0,
            files: Vec::new(),
        };
        for dir in pr_dirs {
            if walk.done() {
                break;
            }
            walk.visit(&dir)?;
        }

        debug!(
            builds = walk.builds,
            files = walk.files.len(),
            "Found cached artifacts"
        );
        Ok(walk.files)
    }
}

struct Walk {
    max_builds: usize,
    builds: usize,
    files: Vec<PathBuf>,
}

impl Walk {
    fn done(&self) -> bool {
        self.builds >= self.max_builds
    }

    fn visit(&mut self, dir: &Path) -> Result<(), GcsError> {
        for path in read_dir_sorted(dir)? {
            if self.done() {
                break;
            }
            if path.is_dir() {
                self.visit(&path)?;
                continue;
            }
            if path.file_name().is_some_and(|n| n == PROWJOB_FILE) {
                self.builds += 1;
            }
            self.files.push(path);
        }
        Ok(())
    }
}

fn dir_pr_number(dir: &Path) -> Option<u64> {
    dir.file_name()?.to_str()?.parse().ok()
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, GcsError> {
    let mut paths = fs::read_dir(dir)
        .map_err(|e| GcsError::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| GcsError::io(dir, e))?;
    paths.sort();
    Ok(paths)
}
