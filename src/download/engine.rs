//! Download engine for concurrent screenshot downloads.
//!
//! This module provides the `DownloadEngine` which runs a
//! [`ScreenshotDownloader`] over a whole identifier set using a
//! semaphore-based concurrency control pattern.
//!
//! # Example
//!
//! ```no_run
//! use std::collections::BTreeSet;
//! use std::sync::Arc;
//! use screenshot_downloader::download::{
//!     DownloadEngine, DownloadStats, HttpClient, RetryPolicy, ScreenshotDownloader,
//! };
//! use screenshot_downloader::site::{AssetResolver, SiteEndpoints};
//! use screenshot_downloader::ScreenshotId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new();
//! let resolver = AssetResolver::new(client.clone(), SiteEndpoints::default())?;
//! let downloader = Arc::new(ScreenshotDownloader::new(
//!     client,
//!     resolver,
//!     "./Screenshots76561197960279927",
//!     RetryPolicy::default(),
//! ));
//! let ids: BTreeSet<ScreenshotId> = [ScreenshotId::new(1)].into_iter().collect();
//! let engine = DownloadEngine::new(16)?;
//! let report = engine.process(&ids, downloader, Arc::new(DownloadStats::new())).await?;
//! println!("Completed: {}, Failed: {}", report.completed(), report.failed());
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use super::task::{DownloadOutcome, ScreenshotDownloader};
use crate::screenshot::ScreenshotId;

/// Minimum allowed concurrency value.
const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
const MAX_CONCURRENCY: usize = 100;

/// Default concurrency if not specified.
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Error type for download engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// Live counters for a download run.
///
/// Updated by download tasks as they finish and read by progress reporting
/// while the run is in flight.
#[derive(Debug, Default)]
pub struct DownloadStats {
    completed: AtomicUsize,
    failed: AtomicUsize,
    retried: AtomicUsize,
}

impl DownloadStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of successfully completed downloads.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Returns the number of failed downloads.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Returns the total number of screenshots finished (completed + failed).
    #[must_use]
    pub fn total(&self) -> usize {
        self.completed() + self.failed()
    }

    /// Returns the number of retry attempts made.
    #[must_use]
    pub fn retried(&self) -> usize {
        self.retried.load(Ordering::SeqCst)
    }

    fn increment_completed(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    pub(super) fn increment_retried(&self) {
        self.retried.fetch_add(1, Ordering::SeqCst);
    }
}

/// Per-screenshot outcomes of one engine run, in completion-collection order.
#[derive(Debug, Default)]
pub struct DownloadReport {
    /// Outcome of every screenshot whose task ran to completion.
    pub outcomes: Vec<(ScreenshotId, DownloadOutcome)>,
}

impl DownloadReport {
    /// Screenshots written to disk.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_success()).count()
    }

    /// Screenshots that ended in failure.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.completed()
    }

    /// Looks up the outcome for one screenshot.
    #[must_use]
    pub fn outcome(&self, id: ScreenshotId) -> Option<&DownloadOutcome> {
        self.outcomes
            .iter()
            .find(|(candidate, _)| *candidate == id)
            .map(|(_, outcome)| outcome)
    }
}

/// Download engine for bounded-concurrency screenshot downloads.
///
/// # Concurrency Model
///
/// - Each screenshot downloads in its own Tokio task
/// - A semaphore permit is acquired before spawning each task, so admission
///   blocks while `concurrency` downloads are in flight
/// - Permits are released automatically when downloads complete (RAII)
/// - Screenshots are admitted in set order; completion order is unspecified
#[derive(Debug)]
pub struct DownloadEngine {
    semaphore: Arc<Semaphore>,
    concurrency: usize,
}

impl DownloadEngine {
    /// Creates a new download engine with the specified concurrency limit.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] if the value is outside
    /// the valid range (1-100).
    ///
    /// # Example
    ///
    /// ```
    /// use screenshot_downloader::download::DownloadEngine;
    ///
    /// let engine = DownloadEngine::new(16).unwrap();
    /// assert_eq!(engine.concurrency(), 16);
    /// ```
    #[instrument(level = "debug")]
    pub fn new(concurrency: usize) -> Result<Self, EngineError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(EngineError::InvalidConcurrency { value: concurrency });
        }

        debug!(concurrency, "creating download engine");

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        })
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Downloads every screenshot in `ids` and waits for all of them to finish.
    ///
    /// Individual download failures do NOT cause this method to error; they
    /// are logged, counted in `stats` and recorded in the report.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SemaphoreClosed`] if the semaphore is closed.
    #[instrument(skip_all, fields(screenshots = ids.len(), concurrency = self.concurrency))]
    pub async fn process(
        &self,
        ids: &BTreeSet<ScreenshotId>,
        downloader: Arc<ScreenshotDownloader>,
        stats: Arc<DownloadStats>,
    ) -> Result<DownloadReport, EngineError> {
        let mut handles = Vec::with_capacity(ids.len());

        info!("starting downloads");

        for &id in ids {
            // Blocks while `concurrency` downloads are in flight
            let permit = self
                .semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| EngineError::SemaphoreClosed)?;

            let downloader = Arc::clone(&downloader);
            let stats = Arc::clone(&stats);

            handles.push((
                id,
                tokio::spawn(async move {
                    // Permit is dropped when this block exits (RAII)
                    let _permit = permit;

                    let outcome = downloader.download(id, &stats).await;
                    log_outcome(id, &outcome, &stats);
                    outcome
                }),
            ));
        }

        debug!(
            task_count = handles.len(),
            "waiting for downloads to complete"
        );

        let mut report = DownloadReport::default();
        for (id, handle) in handles {
            match handle.await {
                Ok(outcome) => report.outcomes.push((id, outcome)),
                Err(e) => {
                    warn!(screenshot = %id, error = %e, "download task panicked");
                    stats.increment_failed();
                }
            }
        }

        info!(
            completed = stats.completed(),
            failed = stats.failed(),
            retried = stats.retried(),
            total = stats.total(),
            "downloads finished"
        );

        Ok(report)
    }
}

fn log_outcome(id: ScreenshotId, outcome: &DownloadOutcome, stats: &DownloadStats) {
    match outcome {
        DownloadOutcome::Success {
            path,
            bytes,
            attempts,
            ..
        } => {
            info!(screenshot = %id, path = %path.display(), bytes, attempts, "download completed");
            stats.increment_completed();
        }
        DownloadOutcome::Failed { error, attempts } => {
            warn!(screenshot = %id, error = %error, attempts, "download failed");
            stats.increment_failed();
        }
    }
}
