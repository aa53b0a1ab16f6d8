//! Batch execution — existence filtering, the bounded worker pool, outcome
//! collection.

use super::CollectionDownloader;
use crate::error::Result;
use crate::existence::{self, FileCheck};
use crate::paths;
use crate::report::BatchReport;
use crate::types::{DownloadDescriptor, DownloadOutcome, Event};
use futures::StreamExt;
use futures::stream;

impl CollectionDownloader {
    /// Process a batch of descriptors and return one outcome per descriptor
    ///
    /// Descriptors flow through the existence check and, when needed, the
    /// fetcher, with at most `worker_count` transfers in flight at any
    /// instant (`worker_count == 1` degrades to fully sequential execution).
    /// Completion order is unspecified, but every submitted descriptor yields
    /// exactly one outcome before this returns, and no descriptor failure can
    /// cancel, block, or abort any other: each error is converted to a
    /// `Failed` outcome at the descriptor boundary.
    ///
    /// The only error this method itself returns is an invalid
    /// `worker_count`, rejected before any worker starts.
    pub async fn run(&self, descriptors: Vec<DownloadDescriptor>) -> Result<Vec<DownloadOutcome>> {
        self.config.validate()?;

        let total = descriptors.len();
        tracing::info!(
            total,
            workers = self.config.worker_count,
            force = self.config.force,
            "starting batch"
        );
        self.emit_event(Event::BatchStarted { total });
        self.warn_if_low_space(&descriptors);

        let outcomes: Vec<DownloadOutcome> = stream::iter(descriptors)
            .map(|descriptor| self.process(descriptor))
            .buffer_unordered(self.config.worker_count)
            .collect()
            .await;

        let report = BatchReport::from_outcomes(&outcomes);
        self.emit_event(Event::BatchFinished {
            downloaded: report.downloaded,
            skipped: report.skipped,
            failed: report.failed,
        });
        if report.is_clean() {
            tracing::info!(
                downloaded = report.downloaded,
                skipped = report.skipped,
                "batch finished"
            );
        } else {
            tracing::warn!(
                downloaded = report.downloaded,
                skipped = report.skipped,
                failed = report.failed,
                "batch finished with failures"
            );
        }

        Ok(outcomes)
    }

    /// Process one descriptor to its terminal outcome
    ///
    /// Infallible by type: whatever the existence check or the fetcher hits
    /// comes back as a `Failed` outcome value, so the pool cannot swallow a
    /// worker failure.
    async fn process(&self, descriptor: DownloadDescriptor) -> DownloadOutcome {
        let verdict = existence::check(
            &descriptor.destination_path,
            descriptor.expected_size,
            self.config.force,
        )
        .await;

        let outcome = match verdict {
            Ok(FileCheck::AlreadySatisfied) => {
                tracing::debug!(
                    item = %descriptor.display_name(),
                    path = %descriptor.destination_path.display(),
                    "already present with expected size"
                );
                DownloadOutcome::skipped(descriptor, "already present with expected size")
            }
            Ok(FileCheck::NeedsDownload) => {
                match self
                    .fetcher
                    .fetch(&descriptor.source_url, &descriptor.destination_path)
                    .await
                {
                    Ok(bytes_written) => {
                        tracing::info!(
                            item = %descriptor.display_name(),
                            path = %descriptor.destination_path.display(),
                            bytes_written,
                            "downloaded"
                        );
                        DownloadOutcome::downloaded(descriptor, bytes_written)
                    }
                    Err(e) => {
                        tracing::warn!(
                            item = %descriptor.display_name(),
                            url = %descriptor.source_url,
                            error = %e,
                            "download failed"
                        );
                        let detail = e.to_string();
                        DownloadOutcome::failed(descriptor, detail)
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    item = %descriptor.display_name(),
                    path = %descriptor.destination_path.display(),
                    error = %e,
                    "existence check failed"
                );
                let detail = e.to_string();
                DownloadOutcome::failed(descriptor, detail)
            }
        };

        self.emit_event(Event::for_outcome(&outcome));
        outcome
    }

    /// Warn when the batch's expected bytes exceed free space at the root
    ///
    /// Advisory only: the run proceeds either way, and per-item write
    /// failures surface as `Failed` outcomes like any other.
    fn warn_if_low_space(&self, descriptors: &[DownloadDescriptor]) {
        let needed: u64 = descriptors.iter().filter_map(|d| d.expected_size).sum();
        if needed == 0 {
            return;
        }

        match paths::available_space(&self.config.destination_root) {
            Ok(available) if available < needed => {
                tracing::warn!(
                    needed,
                    available,
                    root = %self.config.destination_root.display(),
                    "expected batch size exceeds free space at destination"
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, "could not determine free space");
            }
        }
    }
}
