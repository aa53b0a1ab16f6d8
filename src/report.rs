//! Batch outcome aggregation and summary reporting
//!
//! A pure consumer of outcomes: nothing here feeds back into scheduling.
//! Callers typically map [`BatchReport::is_clean`] to the process exit
//! status.

use crate::types::{DownloadOutcome, OutcomeStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything needed to retry one failed item by hand
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Artist of the failed item
    pub artist: String,

    /// Title of the failed item
    pub title: String,

    /// Source URL the transfer was attempted from
    pub url: String,

    /// Why the item failed
    pub detail: String,
}

/// Aggregated view of a finished (or in-progress) batch
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchReport {
    /// Items transferred
    pub downloaded: usize,

    /// Items whose local file already matched
    pub skipped: usize,

    /// Items that failed
    pub failed: usize,

    /// One record per failed item, in completion order
    pub failures: Vec<FailureRecord>,

    /// When recording started
    pub started_at: DateTime<Utc>,
}

impl BatchReport {
    /// Empty report, ready to record a stream of outcomes
    pub fn new() -> Self {
        Self {
            downloaded: 0,
            skipped: 0,
            failed: 0,
            failures: Vec::new(),
            started_at: Utc::now(),
        }
    }

    /// Build a report from an already-completed outcome sequence
    pub fn from_outcomes(outcomes: &[DownloadOutcome]) -> Self {
        let mut report = Self::new();
        for outcome in outcomes {
            report.record(outcome);
        }
        report
    }

    /// Fold one outcome into the running counts
    pub fn record(&mut self, outcome: &DownloadOutcome) {
        match outcome.status {
            OutcomeStatus::Downloaded => self.downloaded += 1,
            OutcomeStatus::Skipped => self.skipped += 1,
            OutcomeStatus::Failed => {
                self.failed += 1;
                self.failures.push(FailureRecord {
                    artist: outcome.descriptor.artist.clone(),
                    title: outcome.descriptor.title.clone(),
                    url: outcome.descriptor.source_url.clone(),
                    detail: outcome.detail.clone(),
                });
            }
        }
    }

    /// Total outcomes recorded
    pub fn total(&self) -> usize {
        self.downloaded + self.skipped + self.failed
    }

    /// Whether every item ended as downloaded or skipped
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} items: {} downloaded, {} skipped, {} failed",
            self.total(),
            self.downloaded,
            self.skipped,
            self.failed
        )?;
        for failure in &self.failures {
            writeln!(
                f,
                "  FAILED {} - {} [{}]: {}",
                failure.artist, failure.title, failure.url, failure.detail
            )?;
        }
        Ok(())
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DownloadDescriptor;
    use std::path::Path;

    fn descriptor(title: &str) -> DownloadDescriptor {
        DownloadDescriptor {
            artist: "Artist".to_string(),
            title: title.to_string(),
            source_url: format!("https://dl.example/{title}"),
            destination_path: Path::new("/music/Artist").join(title),
            expected_size: Some(10),
        }
    }

    #[test]
    fn counts_follow_recorded_outcomes() {
        let outcomes = vec![
            DownloadOutcome::downloaded(descriptor("a"), 10),
            DownloadOutcome::skipped(descriptor("b"), "already present"),
            DownloadOutcome::skipped(descriptor("c"), "already present"),
            DownloadOutcome::failed(descriptor("d"), "HTTP 500"),
        ];

        let report = BatchReport::from_outcomes(&outcomes);
        assert_eq!(report.downloaded, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.total(), 4);
        assert!(!report.is_clean());
    }

    #[test]
    fn failure_records_carry_identity_and_cause() {
        let mut report = BatchReport::new();
        report.record(&DownloadOutcome::failed(
            descriptor("broken"),
            "server returned HTTP 403",
        ));

        assert_eq!(report.failures.len(), 1);
        let failure = &report.failures[0];
        assert_eq!(failure.title, "broken");
        assert_eq!(failure.url, "https://dl.example/broken");
        assert!(
            failure.detail.contains("403"),
            "detail must be enough for a manual retry"
        );
    }

    #[test]
    fn clean_report_has_no_failure_lines() {
        let outcomes = vec![DownloadOutcome::downloaded(descriptor("a"), 10)];
        let report = BatchReport::from_outcomes(&outcomes);
        assert!(report.is_clean());

        let rendered = report.to_string();
        assert!(rendered.contains("1 downloaded"));
        assert!(!rendered.contains("FAILED"));
    }

    #[test]
    fn display_lists_each_failure() {
        let outcomes = vec![
            DownloadOutcome::failed(descriptor("x"), "timed out"),
            DownloadOutcome::failed(descriptor("y"), "HTTP 404"),
        ];
        let rendered = BatchReport::from_outcomes(&outcomes).to_string();
        assert!(rendered.contains("FAILED Artist - x"));
        assert!(rendered.contains("timed out"));
        assert!(rendered.contains("FAILED Artist - y"));
        assert!(rendered.contains("HTTP 404"));
    }

    #[test]
    fn empty_report_is_clean_and_zero() {
        let report = BatchReport::new();
        assert_eq!(report.total(), 0);
        assert!(report.is_clean());
    }
}
