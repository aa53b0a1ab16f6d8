//! Core types for bandcamp-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Encoding formats offered by the storefront
///
/// The serde names are the wire names used in the download-page JSON, so a
/// format deserialized from a page can be compared against the configured one
/// directly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DownloadFormat {
    /// AAC, high quality
    #[serde(rename = "aac-hi")]
    AacHi,
    /// AIFF, lossless
    #[serde(rename = "aiff-lossless")]
    AiffLossless,
    /// Apple Lossless
    #[serde(rename = "alac")]
    Alac,
    /// FLAC
    #[serde(rename = "flac")]
    Flac,
    /// MP3 320 kbps (default)
    #[default]
    #[serde(rename = "mp3-320")]
    Mp3320,
    /// MP3 VBR V0
    #[serde(rename = "mp3-v0")]
    Mp3V0,
    /// Ogg Vorbis
    #[serde(rename = "vorbis")]
    Vorbis,
    /// WAV
    #[serde(rename = "wav")]
    Wav,
}

impl DownloadFormat {
    /// All supported formats, in wire-name order
    pub const ALL: [DownloadFormat; 8] = [
        DownloadFormat::AacHi,
        DownloadFormat::AiffLossless,
        DownloadFormat::Alac,
        DownloadFormat::Flac,
        DownloadFormat::Mp3320,
        DownloadFormat::Mp3V0,
        DownloadFormat::Vorbis,
        DownloadFormat::Wav,
    ];

    /// The wire name, as it appears in download-page JSON keys
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadFormat::AacHi => "aac-hi",
            DownloadFormat::AiffLossless => "aiff-lossless",
            DownloadFormat::Alac => "alac",
            DownloadFormat::Flac => "flac",
            DownloadFormat::Mp3320 => "mp3-320",
            DownloadFormat::Mp3V0 => "mp3-v0",
            DownloadFormat::Vorbis => "vorbis",
            DownloadFormat::Wav => "wav",
        }
    }

    /// File extension for a single track in this format
    ///
    /// Albums always materialize as `.zip` archives regardless of format; this
    /// extension applies to single-track purchases only.
    pub fn audio_extension(&self) -> &'static str {
        match self {
            DownloadFormat::AacHi | DownloadFormat::Alac => "m4a",
            DownloadFormat::AiffLossless => "aiff",
            DownloadFormat::Flac => "flac",
            DownloadFormat::Mp3320 | DownloadFormat::Mp3V0 => "mp3",
            DownloadFormat::Vorbis => "ogg",
            DownloadFormat::Wav => "wav",
        }
    }
}

impl std::fmt::Display for DownloadFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unsupported format name
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported download format: {0}")]
pub struct UnknownFormat(pub String);

impl std::str::FromStr for DownloadFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        DownloadFormat::ALL
            .iter()
            .find(|f| f.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

/// Whether a purchased item is a full album or a single track
///
/// Decides the destination file extension: albums arrive as zip archives,
/// tracks as a single audio file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Full album (zip archive)
    #[default]
    Album,
    /// Single track (one audio file)
    Track,
}

/// One unit of downloadable work, produced by the resolver
///
/// `destination_path` is a pure function of the destination root, artist,
/// title, format, and item kind (see [`crate::paths::destination_for`]), so
/// re-runs over the same collection target the same files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadDescriptor {
    /// Artist name; namespaces the destination directory
    pub artist: String,

    /// Item title; derives the file name
    pub title: String,

    /// Resolved, authenticated fetch location
    pub source_url: String,

    /// Where the item materializes on disk
    pub destination_path: PathBuf,

    /// Authoritative byte size for the existence check
    ///
    /// `None` means the source could not report a size ahead of transfer; the
    /// existence check then treats any local file as stale.
    pub expected_size: Option<u64>,
}

impl DownloadDescriptor {
    /// "Artist - Title" label for logs and failure reports
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }
}

/// Terminal status of one descriptor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// Local file already satisfied the request; no transfer happened
    Skipped,
    /// Transferred and made visible at the destination path
    Downloaded,
    /// The descriptor failed; the batch continued without it
    Failed,
}

/// The terminal result of processing one descriptor
///
/// Created exactly once per descriptor, after the existence check and (if
/// needed) the fetch have run; immutable once created.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadOutcome {
    /// The originating descriptor
    pub descriptor: DownloadDescriptor,

    /// Terminal status
    pub status: OutcomeStatus,

    /// Human-readable reason (size mismatch, network error, HTTP status, ...)
    pub detail: String,

    /// Bytes written, for downloaded items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_written: Option<u64>,

    /// When the outcome was produced
    pub finished_at: DateTime<Utc>,
}

impl DownloadOutcome {
    /// Outcome for an item whose local file already matched
    pub fn skipped(descriptor: DownloadDescriptor, detail: impl Into<String>) -> Self {
        Self {
            descriptor,
            status: OutcomeStatus::Skipped,
            detail: detail.into(),
            bytes_written: None,
            finished_at: Utc::now(),
        }
    }

    /// Outcome for a completed transfer
    pub fn downloaded(descriptor: DownloadDescriptor, bytes_written: u64) -> Self {
        Self {
            descriptor,
            status: OutcomeStatus::Downloaded,
            detail: format!("fetched {bytes_written} bytes"),
            bytes_written: Some(bytes_written),
            finished_at: Utc::now(),
        }
    }

    /// Outcome for a descriptor-level failure
    pub fn failed(descriptor: DownloadDescriptor, detail: impl Into<String>) -> Self {
        Self {
            descriptor,
            status: OutcomeStatus::Failed,
            detail: detail.into(),
            bytes_written: None,
            finished_at: Utc::now(),
        }
    }
}

/// Event emitted while a batch runs
///
/// Events are broadcast to any number of subscribers and never affect
/// scheduling; a batch runs identically with zero listeners.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A batch started
    BatchStarted {
        /// Number of descriptors submitted
        total: usize,
    },

    /// An item's local file already matched; no transfer happened
    ItemSkipped {
        /// Artist name
        artist: String,
        /// Item title
        title: String,
        /// Destination path that was already satisfied
        path: PathBuf,
    },

    /// An item finished downloading
    ItemDownloaded {
        /// Artist name
        artist: String,
        /// Item title
        title: String,
        /// Destination path the item materialized at
        path: PathBuf,
        /// Bytes written
        bytes: u64,
    },

    /// An item failed; the batch continues
    ItemFailed {
        /// Artist name
        artist: String,
        /// Item title
        title: String,
        /// Source URL, for manual retry
        url: String,
        /// Failure detail
        error: String,
    },

    /// All submitted descriptors have an outcome
    BatchFinished {
        /// Items downloaded
        downloaded: usize,
        /// Items skipped
        skipped: usize,
        /// Items failed
        failed: usize,
    },
}

impl Event {
    /// The event corresponding to a finished outcome
    pub fn for_outcome(outcome: &DownloadOutcome) -> Self {
        let d = &outcome.descriptor;
        match outcome.status {
            OutcomeStatus::Skipped => Event::ItemSkipped {
                artist: d.artist.clone(),
                title: d.title.clone(),
                path: d.destination_path.clone(),
            },
            OutcomeStatus::Downloaded => Event::ItemDownloaded {
                artist: d.artist.clone(),
                title: d.title.clone(),
                path: d.destination_path.clone(),
                bytes: outcome.bytes_written.unwrap_or(0),
            },
            OutcomeStatus::Failed => Event::ItemFailed {
                artist: d.artist.clone(),
                title: d.title.clone(),
                url: d.source_url.clone(),
                error: outcome.detail.clone(),
            },
        }
    }
}
