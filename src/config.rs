//! Configuration types for bandcamp-dl

use crate::error::{Error, Result};
use crate::types::DownloadFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Lowest accepted fetch parallelism
pub const MIN_WORKERS: usize = 1;

/// Highest accepted fetch parallelism
pub const MAX_WORKERS: usize = 32;

/// Default fetch parallelism
pub const DEFAULT_WORKERS: usize = 5;

/// Main configuration for [`crate::CollectionDownloader`]
///
/// Works out of the box with zero configuration: defaults download the
/// collection as mp3-320 into the current directory with five workers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Directory under which all destination paths are rooted (default: ".")
    #[serde(default = "default_destination_root")]
    pub destination_root: PathBuf,

    /// Degree of fetch parallelism (default: 5, valid 1-32)
    ///
    /// `1` degrades to fully sequential execution, useful as a diagnostic
    /// mode: failures then surface synchronously and deterministically.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Always redownload, even when a correctly sized file exists (default: false)
    #[serde(default)]
    pub force: bool,

    /// Encoding format to download (default: mp3-320)
    #[serde(default)]
    pub format: DownloadFormat,

    /// HTTP client settings
    #[serde(flatten)]
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            destination_root: default_destination_root(),
            worker_count: default_worker_count(),
            force: false,
            format: DownloadFormat::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Validate settings that would prevent a run from starting at all
    ///
    /// An out-of-range `worker_count` is the only batch-fatal configuration
    /// and is rejected here, before any worker starts; per-descriptor
    /// problems are reported as `Failed` outcomes instead.
    pub fn validate(&self) -> Result<()> {
        if self.worker_count < MIN_WORKERS || self.worker_count > MAX_WORKERS {
            return Err(Error::Config {
                message: format!(
                    "worker_count must be between {MIN_WORKERS} and {MAX_WORKERS}, got {}",
                    self.worker_count
                ),
                key: Some("worker_count".to_string()),
            });
        }
        Ok(())
    }
}

/// HTTP client settings shared by the resolver and the fetcher
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Overall per-request timeout in seconds (default: 60)
    ///
    /// A transfer exceeding this surfaces as a transport-level fetch error
    /// for that descriptor only; siblings are unaffected.
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// Connection establishment timeout in seconds (default: 15)
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,

    /// User-Agent header sent on every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_destination_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_worker_count() -> usize {
    DEFAULT_WORKERS
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_user_agent() -> String {
    concat!("bandcamp-dl/", env!("CARGO_PKG_VERSION")).to_string()
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
