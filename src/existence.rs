//! Local file existence and size verification
//!
//! Decides, before any network traffic, whether a descriptor's destination
//! already satisfies the request. The only authoritative signal is byte
//! length: contents are never read and never hashed.

use crate::error::CheckError;
use std::path::Path;

/// Verdict of the existence check
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileCheck {
    /// No satisfying file is present; the fetcher must run
    NeedsDownload,
    /// A file of exactly the expected size is present; skip the fetch
    AlreadySatisfied,
}

/// Check whether `path` already satisfies a descriptor
///
/// Rules, in order:
/// - `force` set: always `NeedsDownload`, regardless of local state.
/// - nothing at `path`: `NeedsDownload`.
/// - a non-regular file at `path`: [`CheckError::DestinationConflict`] —
///   neither silently skipped nor overwritten.
/// - `expected_size` unknown: `NeedsDownload`, since the file cannot be
///   verified (a zero expected size and a zero-byte file do match).
/// - otherwise `AlreadySatisfied` exactly when the byte length matches;
///   a mismatched file will be overwritten by the fetch.
///
/// The only side effect is a single metadata read.
pub async fn check(
    path: &Path,
    expected_size: Option<u64>,
    force: bool,
) -> Result<FileCheck, CheckError> {
    if force {
        return Ok(FileCheck::NeedsDownload);
    }

    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(FileCheck::NeedsDownload);
        }
        Err(source) => {
            return Err(CheckError::Metadata {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if !metadata.is_file() {
        return Err(CheckError::DestinationConflict {
            path: path.to_path_buf(),
        });
    }

    match expected_size {
        Some(expected) if metadata.len() == expected => Ok(FileCheck::AlreadySatisfied),
        Some(_) => Ok(FileCheck::NeedsDownload),
        // Unknown size: cannot verify, must refetch to be safe.
        None => Ok(FileCheck::NeedsDownload),
    }
}
