//! Download orchestration engine.
//!
//! [`CollectionDownloader`] owns the pieces a batch needs — the validated
//! configuration, the authenticated HTTP client, the fetcher behind its trait
//! seam, and the event channel — and is organized as:
//! - [`run`] - batch execution: existence filtering, the bounded worker pool,
//!   outcome collection

mod run;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

use crate::collection::CollectionResolver;
use crate::config::Config;
use crate::error::Result;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::session::Session;
use crate::types::Event;
use std::sync::Arc;

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct CollectionDownloader {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Transfer implementation behind the trait seam
    pub(crate) fetcher: Arc<dyn Fetcher>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Shared HTTP client, also used by the resolver
    pub(crate) client: reqwest::Client,
}

impl CollectionDownloader {
    /// Create a new CollectionDownloader instance
    ///
    /// Validates the configuration (an out-of-range `worker_count` is
    /// rejected here, before any run can start), builds the authenticated
    /// HTTP client from the session, and sets up the event broadcast channel.
    pub fn new(session: &Session, config: Config) -> Result<Self> {
        config.validate()?;
        let client = session.client(&config.http)?;

        // Buffered so slow subscribers don't stall the pool; a subscriber
        // falling more than 1024 events behind sees RecvError::Lagged.
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1024);

        Ok(Self {
            config: Arc::new(config),
            fetcher: Arc::new(HttpFetcher::new(client.clone())),
            event_tx,
            client,
        })
    }

    /// Subscribe to batch events
    ///
    /// Multiple subscribers are supported; each receives all events
    /// independently. Events never affect scheduling — a batch runs
    /// identically with zero listeners.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// A collection resolver sharing this downloader's client and config
    pub fn resolver(&self) -> CollectionResolver {
        CollectionResolver::new(self.client.clone(), Arc::clone(&self.config))
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// a batch never depends on anyone listening.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Build a downloader around a custom fetcher implementation
    ///
    /// The seam orchestration tests use to observe and script transfers.
    #[cfg(test)]
    pub(crate) fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        config.validate()?;
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1024);
        Ok(Self {
            config: Arc::new(config),
            fetcher,
            event_tx,
            client: reqwest::Client::new(),
        })
    }
}
