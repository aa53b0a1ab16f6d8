//! Error types for bandcamp-dl
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (Check, Fetch, Resolve)
//! - Per-descriptor error containment: everything in [`CheckError`] and
//!   [`FetchError`] is fatal for one descriptor only and is converted into a
//!   `Failed` outcome at the scheduler boundary, never propagated out of a run

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bandcamp-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for bandcamp-dl
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "worker_count")
        key: Option<String>,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid URL
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Collection resolution error
    #[error("collection error: {0}")]
    Resolve(#[from] ResolveError),

    /// File transfer error
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Existence check error
    #[error("existence check error: {0}")]
    Check(#[from] CheckError),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Errors raised by the existence checker before any transfer starts
///
/// Both variants are fatal for the affected descriptor only.
#[derive(Debug, Error)]
pub enum CheckError {
    /// A non-regular-file object (directory, socket, ...) occupies the destination path
    #[error("destination {} is occupied by a non-regular file", path.display())]
    DestinationConflict {
        /// The destination path that is already occupied
        path: PathBuf,
    },

    /// Reading file metadata failed for a reason other than the file being absent
    #[error("failed to read metadata for {}: {source}", path.display())]
    Metadata {
        /// The path whose metadata could not be read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while transferring one item to its destination
///
/// The fetcher never retries internally; each variant carries enough context
/// for the failure report to support a manual retry.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success HTTP status
    #[error("server returned HTTP {status} for {url}")]
    Status {
        /// The HTTP status code received
        status: reqwest::StatusCode,
        /// The URL that was requested
        url: String,
    },

    /// Transport-level failure (connection reset, timeout, interrupted body)
    #[error("transfer failed for {url}: {source}")]
    Transport {
        /// The URL that was being transferred
        url: String,
        /// The underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// Writing the transferred bytes to disk failed
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// The path that could not be written
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while resolving a collection into download descriptors
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The page carries no pagedata blob to scrape
    #[error("no pagedata blob found at {url}")]
    PageDataMissing {
        /// The URL of the page that was scraped
        url: String,
    },

    /// The pagedata blob was present but did not parse as the expected JSON
    #[error("malformed pagedata blob at {url}: {source}")]
    MalformedPageData {
        /// The URL of the page that was scraped
        url: String,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// A download page listed no downloadable items at all
    #[error("no download items listed at {url}")]
    NoDownloadItems {
        /// The URL of the download page
        url: String,
    },

    /// The item exists but offers no download in the requested format
    #[error("no {format} download available for \"{title}\"")]
    FormatUnavailable {
        /// The item title
        title: String,
        /// The requested format's wire name
        format: String,
    },

    /// An HTTP request made during resolution failed
    #[error("collection request failed: {0}")]
    Http(#[from] reqwest::Error),
}
