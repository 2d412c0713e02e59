// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Anonymous access to a public Google Cloud Storage bucket
//!
//! Listings go through the JSON API, downloads through the public
//! `storage.googleapis.com/<bucket>/<object>` endpoint. No credentials are
//! needed for world-readable buckets such as the Prow log buckets.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use tracing::debug;

use crate::error::GcsError;
use crate::object::{ObjectMeta, public_url};
use crate::store::{BlobStore, ListPage, ListQuery};

/// Default endpoint for both the JSON API and public downloads
pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

const USER_AGENT: &str = concat!("prowdig/", env!("CARGO_PKG_VERSION"));
const LIST_FIELDS: &str = "items(name,size,crc32c),prefixes,nextPageToken";

/// A public GCS bucket
#[derive(Debug, Clone)]
pub struct GcsBucket {
    client: reqwest::Client,
    bucket: String,
    api_base: String,
    download_base: String,
}

impl GcsBucket {
    /// Access `bucket` through the default endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(bucket: &str) -> Result<Self, GcsError> {
        Self::with_endpoint(bucket, DEFAULT_ENDPOINT)
    }

    /// Access `bucket` through another endpoint, e.g. a local emulator
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_endpoint(bucket: &str, endpoint: &str) -> Result<Self, GcsError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        let endpoint = endpoint.trim_end_matches('/');
        Ok(Self {
            client,
            bucket: bucket.to_string(),
            api_base: endpoint.to_string(),
            download_base: endpoint.to_string(),
        })
    }

    /// Bucket name
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn list_url(&self) -> String {
        format!("{}/storage/v1/b/{}/o", self.api_base, self.bucket)
    }
}

#[async_trait]
impl BlobStore for GcsBucket {
    async fn list_page(&self, query: &ListQuery) -> Result<ListPage, GcsError> {
        let mut params = vec![("prefix", query.prefix.as_str()), ("fields", LIST_FIELDS)];
        if let Some(delimiter) = &query.delimiter {
            params.push(("delimiter", delimiter.as_str()));
        }
        if let Some(token) = &query.page_token {
            params.push(("pageToken", token.as_str()));
        }

        let url = self.list_url();
        let response = self.client.get(&url).query(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GcsError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let page = parse_list_response(&body)?;
        debug!(
            prefix = %query.prefix,
            objects = page.objects.len(),
            prefixes = page.prefixes.len(),
            more = page.next_page_token.is_some(),
            "Listed GCS page"
        );
        Ok(page)
    }

    async fn fetch(&self, name: &str) -> Result<Vec<u8>, GcsError> {
        let url = public_url(&self.download_base, &self.bucket, name);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GcsError::NotFound {
                name: name.to_string(),
            });
        }
        if !status.is_success() {
            return Err(GcsError::Status {
                url,
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    items: Vec<RawObject>,
    #[serde(default)]
    prefixes: Vec<String>,
    next_page_token: Option<String>,
}

/// Object resource as returned by the JSON API; `size` is a decimal string
/// and `crc32c` the base64 of the big-endian checksum.
#[derive(Debug, Deserialize)]
struct RawObject {
    name: String,
    size: String,
    crc32c: Option<String>,
}

fn parse_list_response(body: &[u8]) -> Result<ListPage, GcsError> {
    let response: ListResponse = serde_json::from_slice(body)?;
    let objects = response
        .items
        .into_iter()
        .map(RawObject::into_meta)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ListPage {
        objects,
        prefixes: response.prefixes,
        next_page_token: response.next_page_token,
    })
}

impl RawObject {
    fn into_meta(self) -> Result<ObjectMeta, GcsError> {
        let size = self
            .size
            .parse::<u64>()
            .map_err(|_| GcsError::InvalidAttribute {
                name: self.name.clone(),
                attribute: "size",
                value: self.size.clone(),
            })?;
        // Composite objects uploaded without a checksum never match the cache.
        let crc32c = match &self.crc32c {
            Some(encoded) => decode_crc32c(encoded).ok_or_else(|| GcsError::InvalidAttribute {
                name: self.name.clone(),
                attribute: "crc32c",
                value: encoded.clone(),
            })?,
            None => 0,
        };
        Ok(ObjectMeta {
            name: self.name,
            size,
            crc32c,
        })
    }
}

fn decode_crc32c(encoded: &str) -> Option<u32> {
    let bytes: [u8; 4] = STANDARD.decode(encoded).ok()?.try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}
