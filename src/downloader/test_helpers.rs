//! Shared test helpers for orchestration tests.

use crate::config::Config;
use crate::downloader::CollectionDownloader;
use crate::error::FetchError;
use crate::fetcher::Fetcher;
use crate::types::DownloadDescriptor;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted behavior for one URL
pub(crate) enum FakeTransfer {
    /// Succeed and write this many zero bytes to the destination
    Body(u64),
    /// Fail with this HTTP status
    Status(u16),
}

/// Instrumented [`Fetcher`] for orchestration tests.
///
/// Records every invocation, tracks peak in-flight concurrency, and writes
/// real files on success so existence checks in follow-up runs behave exactly
/// as in production. URLs without scripted behavior succeed with
/// `default_size` bytes.
pub(crate) struct FakeFetcher {
    transfers: Mutex<HashMap<String, FakeTransfer>>,
    default_size: u64,
    delay: Duration,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeFetcher {
    pub(crate) fn new() -> Arc<Self> {
        Self::with_delay(Duration::ZERO)
    }

    /// A fetcher whose transfers take `delay`, so transfers overlap and the
    /// concurrency bound becomes observable
    pub(crate) fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            transfers: Mutex::new(HashMap::new()),
            default_size: 1000,
            delay,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        })
    }

    pub(crate) fn succeed_with(&self, url: &str, size: u64) {
        self.transfers
            .lock()
            .unwrap()
            .insert(url.to_string(), FakeTransfer::Body(size));
    }

    pub(crate) fn fail_with_status(&self, url: &str, status: u16) {
        self.transfers
            .lock()
            .unwrap()
            .insert(url.to_string(), FakeTransfer::Status(status));
    }

    /// URLs fetched so far, in invocation order
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Highest number of concurrently in-flight fetches observed
    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let scripted = {
            let transfers = self.transfers.lock().unwrap();
            match transfers.get(url) {
                Some(FakeTransfer::Status(code)) => Err(*code),
                Some(FakeTransfer::Body(size)) => Ok(*size),
                None => Ok(self.default_size),
            }
        };

        let result = match scripted {
            Ok(size) => {
                if let Some(parent) = destination.parent() {
                    tokio::fs::create_dir_all(parent).await.unwrap();
                }
                tokio::fs::write(destination, vec![0u8; size as usize])
                    .await
                    .unwrap();
                Ok(size)
            }
            Err(code) => Err(FetchError::Status {
                status: reqwest::StatusCode::from_u16(code).unwrap(),
                url: url.to_string(),
            }),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Config rooted at a test directory
pub(crate) fn test_config(root: &Path, worker_count: usize) -> Config {
    Config {
        destination_root: root.to_path_buf(),
        worker_count,
        ..Default::default()
    }
}

/// Downloader wired to a fake fetcher
pub(crate) fn test_downloader(config: Config, fetcher: Arc<FakeFetcher>) -> CollectionDownloader {
    CollectionDownloader::with_fetcher(config, fetcher).unwrap()
}

/// Descriptor whose destination follows the production layout under `root`
pub(crate) fn descriptor_in(root: &Path, title: &str, size: Option<u64>) -> DownloadDescriptor {
    DownloadDescriptor {
        artist: "Test Artist".to_string(),
        title: title.to_string(),
        source_url: format!("https://dl.test/{title}"),
        destination_path: root
            .join("Test Artist")
            .join(format!("{title} [mp3-320].zip")),
        expected_size: size,
    }
}
