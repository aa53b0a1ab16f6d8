//! # bandcamp-dl
//!
//! Backend library for downloading a fan's purchased Bandcamp collection.
//!
//! ## Design Philosophy
//!
//! bandcamp-dl is designed to be:
//! - **Idempotent** - items already present at the right size are skipped, so
//!   re-running over the same collection only fetches what is missing
//! - **Failure-isolating** - one bad item is reported, the rest of the batch
//!   completes; every descriptor ends in exactly one outcome
//! - **Library-first** - no CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - consumers subscribe to batch events, no polling
//!
//! ## Quick Start
//!
//! ```no_run
//! use bandcamp_dl::{BatchReport, CollectionDownloader, Config, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Cookies come from the caller; the library holds no browser state.
//!     let session = Session::with_cookies([("identity", "...")]);
//!     let config = Config {
//!         destination_root: "/music".into(),
//!         ..Default::default()
//!     };
//!
//!     let downloader = CollectionDownloader::new(&session, config)?;
//!     let descriptors = downloader.resolver().resolve("some-fan").await?;
//!     let outcomes = downloader.run(descriptors).await?;
//!
//!     let report = BatchReport::from_outcomes(&outcomes);
//!     print!("{report}");
//!     std::process::exit(if report.is_clean() { 0 } else { 1 });
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Collection resolution (descriptor resolver)
pub mod collection;
/// Configuration types
pub mod config;
/// Download orchestration engine
pub mod downloader;
/// Error types
pub mod error;
/// Local file existence and size verification
pub mod existence;
/// File transfer with atomic destination visibility
pub mod fetcher;
/// Destination path derivation and filesystem helpers
pub mod paths;
/// Batch outcome aggregation and summary reporting
pub mod report;
/// Authenticated session handling
pub mod session;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use collection::CollectionResolver;
pub use config::{Config, HttpConfig, MAX_WORKERS, MIN_WORKERS};
pub use downloader::CollectionDownloader;
pub use error::{CheckError, Error, FetchError, ResolveError, Result};
pub use existence::FileCheck;
pub use fetcher::{Fetcher, HttpFetcher};
pub use report::{BatchReport, FailureRecord};
pub use session::Session;
pub use types::{
    DownloadDescriptor, DownloadFormat, DownloadOutcome, Event, ItemKind, OutcomeStatus,
};
