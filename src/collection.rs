//! Collection resolution — turning a fan's purchases into download descriptors
//!
//! The storefront embeds its state as an HTML-escaped JSON blob in a
//! `<div id="pagedata" data-blob="...">` element. Resolution works in three
//! steps:
//! 1. scrape the fan page for the fan id, collection count and the first
//!    window of redownload URLs,
//! 2. page in the rest of the collection through the fan-collection API,
//! 3. scrape each redownload page for its download item, pick the configured
//!    format and derive the deterministic destination path.
//!
//! A failure on one album page is logged and skipped; it never aborts
//! resolution of the rest of the collection.

use crate::config::Config;
use crate::error::{ResolveError, Result};
use crate::paths;
use crate::types::{DownloadDescriptor, ItemKind};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use url::Url;

/// Production storefront base URL
pub const DEFAULT_BASE_URL: &str = "https://bandcamp.com";

/// API path for paging through a fan's collection
const COLLECTION_ITEMS_PATH: &str = "/api/fancollection/1/collection_items";

#[allow(clippy::expect_used)]
static PAGEDATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<div\s+id="pagedata"[^>]*\bdata-blob="([^"]*)""#)
        .expect("pagedata regex is valid")
});

/// Resolves a username into a list of download descriptors
pub struct CollectionResolver {
    client: reqwest::Client,
    config: Arc<Config>,
    base_url: Url,
}

// --- typed views of the embedded JSON documents ---

#[derive(Debug, Deserialize)]
struct FanPageBlob {
    collection_count: u64,
    fan_data: FanData,
    collection_data: CollectionData,
}

#[derive(Debug, Deserialize)]
struct FanData {
    fan_id: u64,
}

#[derive(Debug, Deserialize)]
struct CollectionData {
    last_token: String,
    #[serde(default)]
    redownload_urls: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
struct CollectionItemsPayload<'a> {
    fan_id: u64,
    count: u64,
    older_than_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct CollectionItemsPage {
    #[serde(default)]
    redownload_urls: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct DownloadPageBlob {
    #[serde(default)]
    download_items: Vec<DownloadItem>,
}

#[derive(Debug, Deserialize)]
struct DownloadItem {
    artist: String,
    title: String,
    #[serde(default, rename = "type")]
    item_type: Option<String>,
    #[serde(default)]
    downloads: HashMap<String, DownloadOption>,
}

#[derive(Debug, Deserialize)]
struct DownloadOption {
    url: String,
}

impl CollectionResolver {
    /// Resolver against the production storefront
    pub fn new(client: reqwest::Client, config: Arc<Config>) -> Self {
        #[allow(clippy::expect_used)]
        let base_url = Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid");
        Self {
            client,
            config,
            base_url,
        }
    }

    /// Resolver against an alternative base URL (tests, mirrors)
    pub fn with_base_url(client: reqwest::Client, config: Arc<Config>, base_url: Url) -> Self {
        Self {
            client,
            config,
            base_url,
        }
    }

    /// Resolve `username`'s collection into download descriptors
    ///
    /// Per-item resolution failures (missing pagedata, format not offered)
    /// are logged and skipped; only failures that prevent listing the
    /// collection at all are returned as errors. An empty collection yields
    /// an empty vector — whether that is an error is caller policy.
    pub async fn resolve(&self, username: &str) -> Result<Vec<DownloadDescriptor>> {
        tracing::info!(username, "retrieving collection");
        let urls = self.download_urls_for(username).await?;
        tracing::info!(username, links = urls.len(), "collection listed");

        let mut descriptors = Vec::with_capacity(urls.len());
        for url in &urls {
            match self.resolve_item(url).await {
                Ok(descriptor) => {
                    tracing::debug!(
                        artist = %descriptor.artist,
                        title = %descriptor.title,
                        "item resolved"
                    );
                    descriptors.push(descriptor);
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "skipping unresolvable item");
                }
            }
        }
        Ok(descriptors)
    }

    /// List every redownload URL in the collection, paging as needed
    async fn download_urls_for(&self, username: &str) -> Result<Vec<String>> {
        let page_url = self.base_url.join(username)?;
        let body = self.get_text(page_url.as_str()).await?;
        let blob: FanPageBlob = parse_pagedata(&body, page_url.as_str())?;

        let mut urls: Vec<String> = blob
            .collection_data
            .redownload_urls
            .into_values()
            .collect();

        // The fan page only embeds the most recent purchases; ask the API for
        // everything older than the embedded token.
        let remaining = blob.collection_count.saturating_sub(urls.len() as u64);
        if remaining > 0 {
            let api_url = self.base_url.join(COLLECTION_ITEMS_PATH)?;
            let payload = CollectionItemsPayload {
                fan_id: blob.fan_data.fan_id,
                count: remaining,
                older_than_token: &blob.collection_data.last_token,
            };
            let page: CollectionItemsPage = self
                .client
                .post(api_url)
                .json(&payload)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(ResolveError::Http)?
                .json()
                .await
                .map_err(ResolveError::Http)?;
            urls.extend(page.redownload_urls.into_values());
        }

        Ok(urls)
    }

    /// Resolve one redownload page into a descriptor
    async fn resolve_item(&self, page_url: &str) -> std::result::Result<DownloadDescriptor, ResolveError> {
        let body = self.get_text(page_url).await?;
        let blob: DownloadPageBlob = parse_pagedata(&body, page_url)?;

        let item = blob
            .download_items
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::NoDownloadItems {
                url: page_url.to_string(),
            })?;

        let format = self.config.format;
        let Some(option) = item.downloads.get(format.as_str()) else {
            return Err(ResolveError::FormatUnavailable {
                title: item.title,
                format: format.to_string(),
            });
        };

        let kind = match item.item_type.as_deref() {
            Some("t") => ItemKind::Track,
            _ => ItemKind::Album,
        };
        let destination_path = paths::destination_for(
            &self.config.destination_root,
            &item.artist,
            &item.title,
            format,
            kind,
        );
        let expected_size = self.probe_size(&option.url).await;

        Ok(DownloadDescriptor {
            source_url: option.url.clone(),
            artist: item.artist,
            title: item.title,
            destination_path,
            expected_size,
        })
    }

    /// Learn the expected byte size ahead of transfer, if the source reports it
    ///
    /// Any probe failure maps to `None`: an unknown size is a forcing
    /// condition for the existence check, not an error.
    async fn probe_size(&self, url: &str) -> Option<u64> {
        let response = match self.client.head(url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::debug!(url, status = %response.status(), "size probe rejected");
                return None;
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "size probe failed");
                return None;
            }
        };

        response
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)?
            .to_str()
            .ok()?
            .parse()
            .ok()
    }

    async fn get_text(&self, url: &str) -> std::result::Result<String, ResolveError> {
        self.client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(ResolveError::Http)?
            .text()
            .await
            .map_err(ResolveError::Http)
    }
}

/// Extract and parse the pagedata blob embedded in `html`
fn parse_pagedata<T: DeserializeOwned>(html: &str, url: &str) -> std::result::Result<T, ResolveError> {
    let captures = PAGEDATA_RE
        .captures(html)
        .ok_or_else(|| ResolveError::PageDataMissing {
            url: url.to_string(),
        })?;
    let blob = unescape_html(&captures[1]);
    serde_json::from_str(&blob).map_err(|source| ResolveError::MalformedPageData {
        url: url.to_string(),
        source,
    })
}

/// Undo the HTML attribute escaping on the pagedata blob
///
/// Handles the named entities the storefront emits plus numeric character
/// references; anything unrecognized is passed through literally.
fn unescape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        // Entities are short; a ';' further away than that is unrelated.
        match tail.find(';') {
            Some(end) if end > 1 && end <= 9 => {
                if let Some(decoded) = decode_entity(&tail[1..end]) {
                    out.push(decoded);
                    rest = &tail[end + 1..];
                } else {
                    out.push('&');
                    rest = &tail[1..];
                }
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "quot" => Some('"'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}
