// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! In-memory object store
//!
//! Behaves like a GCS bucket (lexical order, delimiter grouping, paging) so
//! that the cache and the pipeline can be exercised without a network.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::GcsError;
use crate::object::ObjectMeta;
use crate::store::{BlobStore, ListPage, ListQuery};

/// A bucket held in a `BTreeMap`
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: BTreeMap<String, Vec<u8>>,
    page_size: Option<usize>,
    fetches: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return at most `size` entries per listing page
    #[must_use]
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size.max(1));
        self
    }

    /// Add or replace an object
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.objects.insert(name.into(), content.into());
    }

    /// Number of successful `fetch` calls so far
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

/// An entry of a delimited listing, before paging
enum Entry<'a> {
    Object(&'a str, &'a [u8]),
    Prefix(String),
}

impl Entry<'_> {
    fn key(&self) -> &str {
        match self {
            Entry::Object(name, _) => *name,
            Entry::Prefix(prefix) => prefix.as_str(),
        }
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn list_page(&self, query: &ListQuery) -> Result<ListPage, GcsError> {
        let mut entries = Vec::new();
        let mut seen_prefixes = BTreeSet::new();

        for (name, content) in self.objects.range(query.prefix.clone()..) {
            let Some(rest) = name.strip_prefix(&query.prefix) else {
                break;
            };
            let grouped = query
                .delimiter
                .as_deref()
                .and_then(|d| rest.find(d).map(|i| i + d.len()));
            match grouped {
                Some(end) => {
                    let prefix = format!("{}{}", query.prefix, &rest[..end]);
                    if seen_prefixes.insert(prefix.clone()) {
                        entries.push(Entry::Prefix(prefix));
                    }
                }
                None => entries.push(Entry::Object(name, content)),
            }
        }

        // The page token is the last key of the previous page.
        if let Some(token) = &query.page_token {
            entries.retain(|e| e.key() > token.as_str());
        }
        let page_size = self.page_size.unwrap_or(usize::MAX);
        let next_page_token = (entries.len() > page_size)
            .then(|| entries[page_size - 1].key().to_string());
        entries.truncate(page_size);

        let mut page = ListPage {
            next_page_token,
            ..Default::default()
        };
        for entry in entries {
            match entry {
                Entry::Object(name, content) => {
                    page.objects.push(ObjectMeta::for_content(name, content));
                }
                Entry::Prefix(prefix) => page.prefixes.push(prefix),
            }
        }
        Ok(page)
    }

    async fn fetch(&self, name: &str) -> Result<Vec<u8>, GcsError> {
        let content = self.objects.get(name).ok_or_else(|| GcsError::NotFound {
            name: name.to_string(),
        })?;
        self.fetches.fetch_add(1, Ordering::Relaxed);
        Ok(content.clone())
    }
}
