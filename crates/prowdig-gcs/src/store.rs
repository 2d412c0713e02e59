// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! The object store abstraction
//!
//! The pipeline only needs to list and fetch objects, so anything that can do
//! both (the public GCS bucket, an in-memory fixture) can feed it.

use async_trait::async_trait;
use tracing::debug;

use crate::error::GcsError;
use crate::object::{ObjectMeta, sort_numeric_desc, pr_number};

/// Parameters for one listing request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Only objects whose name starts with this
    pub prefix: String,
    /// Group names at the first delimiter after the prefix
    pub delimiter: Option<String>,
    /// Continuation token from the previous page
    pub page_token: Option<String>,
}

impl ListQuery {
    /// List every object under a prefix, recursively
    #[must_use]
    pub fn objects(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            ..Default::default()
        }
    }

    /// List the direct children of a prefix
    #[must_use]
    pub fn children(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            delimiter: Some("/".to_string()),
            ..Default::default()
        }
    }

    /// Continue from a page token
    #[must_use]
    pub fn after(mut self, token: Option<String>) -> Self {
        self.page_token = token;
        self
    }
}

/// One page of a listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Objects in lexical name order
    pub objects: Vec<ObjectMeta>,
    /// Sub-prefixes when a delimiter was given
    pub prefixes: Vec<String>,
    /// Set when more pages follow
    pub next_page_token: Option<String>,
}

/// Read access to a bucket of CI artifacts
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch one page of a listing
    async fn list_page(&self, query: &ListQuery) -> Result<ListPage, GcsError>;

    /// Download the content of one object
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, GcsError>;

    /// All direct sub-prefixes of `prefix`, across pages
    async fn list_prefixes(&self, prefix: &str) -> Result<Vec<String>, GcsError> {
        let mut prefixes = Vec::new();
        let mut token = None;
        loop {
            let page = self
                .list_page(&ListQuery::children(prefix).after(token))
                .await?;
            prefixes.extend(page.prefixes);
            match page.next_page_token {
                Some(next) => token = Some(next),
                None => return Ok(prefixes),
            }
        }
    }
}

/// PR prefixes under all bucket prefixes, highest PR number first.
///
/// A missing trailing `/` is added to each bucket prefix. Sub-prefixes that
/// do not end with a PR number (batch jobs, stray files) are skipped.
///
/// # Errors
///
/// Returns an error if any listing request fails.
pub async fn list_pr_prefixes(
    store: &dyn BlobStore,
    bucket_prefixes: &[String],
) -> Result<Vec<String>, GcsError> {
    let mut pr_prefixes = Vec::new();
    for prefix in bucket_prefixes {
        let prefix = if prefix.ends_with('/') {
            prefix.clone()
        } else {
            format!("{prefix}/")
        };
        let children = store.list_prefixes(&prefix).await?;
        debug!(prefix = %prefix, count = children.len(), "Listed PR prefixes");
        pr_prefixes.extend(children.into_iter().filter(|p| pr_number(p).is_some()));
    }
    sort_numeric_desc(&mut pr_prefixes);
    Ok(pr_prefixes)
}

/// Objects of the most recent builds, newest PR first.
///
/// Objects are walked in listing order and every `prowjob.json` counts as one
/// build; the walk stops right after the `max_builds`-th one. Only objects
/// accepted by `keep` are returned, but all of them are counted.
///
/// # Errors
///
/// Returns an error if any listing request fails.
pub async fn list_recent_objects(
    store: &dyn BlobStore,
    pr_prefixes: &[String],
    max_builds: usize,
    keep: impl Fn(&str) -> bool + Send + Sync,
) -> Result<Vec<ObjectMeta>, GcsError> {
    let mut builds = 0;
    let mut selected = Vec::new();

    'prefixes: for prefix in pr_prefixes {
        let mut token = None;
        loop {
            if builds >= max_builds {
                break 'prefixes;
            }
            let page = store
                .list_page(&ListQuery::objects(prefix).after(token))
                .await?;
            for object in page.objects {
                if builds >= max_builds {
                    break 'prefixes;
                }
                if object.is_prowjob() {
                    builds += 1;
                }
                if keep(&object.name) {
                    selected.push(object);
                }
            }
            match page.next_page_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
    }

    debug!(builds, objects = selected.len(), "Selected recent build objects");
    Ok(selected)
}
