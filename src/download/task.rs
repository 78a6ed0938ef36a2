//! Per-screenshot download: resolve, fetch, name and write one asset.

use std::path::PathBuf;

use tracing::{debug, info, instrument, warn};

use super::client::HttpClient;
use super::engine::DownloadStats;
use super::error::DownloadError;
use super::filename::{FileNameClaims, asset_file_stem, extension_for_content_type};
use super::retry::{RetryDecision, RetryPolicy, classify_error};
use crate::screenshot::ScreenshotId;
use crate::site::AssetResolver;

/// Terminal result of downloading one screenshot.
#[derive(Debug)]
pub enum DownloadOutcome {
    /// The asset was written to `path`.
    Success {
        /// Where the asset was written.
        path: PathBuf,
        /// Bytes written.
        bytes: u64,
        /// Extension mapped from the declared content type (with leading dot).
        extension: &'static str,
        /// Attempts used, including the successful one.
        attempts: u32,
    },
    /// Every allowed attempt failed, or the failure could not be retried.
    Failed {
        /// The last error seen.
        error: DownloadError,
        /// Attempts made.
        attempts: u32,
    },
}

impl DownloadOutcome {
    /// True for [`DownloadOutcome::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Number of attempts made. Each attempt fetched the detail page once.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. } | Self::Failed { attempts, .. } => *attempts,
        }
    }
}

/// Downloads single screenshots into one target directory.
///
/// Every attempt re-fetches the detail page, so a retry also picks up a
/// changed asset URL.
#[derive(Debug)]
pub struct ScreenshotDownloader {
    client: HttpClient,
    resolver: AssetResolver,
    output_dir: PathBuf,
    retry_policy: RetryPolicy,
    claims: FileNameClaims,
}

/// Asset written by a successful attempt.
struct SavedAsset {
    path: PathBuf,
    bytes: u64,
    extension: &'static str,
}

impl ScreenshotDownloader {
    /// Creates a downloader writing into `output_dir`, which must already exist.
    #[must_use]
    pub fn new(
        client: HttpClient,
        resolver: AssetResolver,
        output_dir: impl Into<PathBuf>,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            client,
            resolver,
            output_dir: output_dir.into(),
            retry_policy,
            claims: FileNameClaims::new(),
        }
    }

    /// Downloads one screenshot, retrying transient failures.
    ///
    /// Never fails as a call: every error ends up in the returned outcome.
    #[instrument(skip(self, stats), fields(screenshot = %id))]
    pub async fn download(&self, id: ScreenshotId, stats: &DownloadStats) -> DownloadOutcome {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(attempt, "attempting download");

            let error = match self.attempt(id).await {
                Ok(saved) => {
                    return DownloadOutcome::Success {
                        path: saved.path,
                        bytes: saved.bytes,
                        extension: saved.extension,
                        attempts: attempt,
                    };
                }
                Err(error) => error,
            };

            match self.retry_policy.should_retry(classify_error(&error), attempt) {
                RetryDecision::Retry { delay, attempt: next_attempt } => {
                    warn!(
                        attempt = next_attempt,
                        max_attempts = self.retry_policy.max_attempts(),
                        delay_ms = delay.as_millis(),
                        error = %error,
                        "retrying download"
                    );
                    stats.increment_retried();
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::DoNotRetry { reason } => {
                    debug!(%reason, "not retrying download");
                    return DownloadOutcome::Failed {
                        error,
                        attempts: attempt,
                    };
                }
            }
        }
    }

    /// One pass of: detail page, asset request, extension, file name, write.
    async fn attempt(&self, id: ScreenshotId) -> Result<SavedAsset, DownloadError> {
        let location = self.resolver.resolve(id).await?;
        let url = location.as_str();
        info!(asset = %location, "downloading");

        let asset = self.client.fetch_asset(url).await?;
        let content_type = asset
            .content_type()
            .ok_or_else(|| DownloadError::missing_content_type(url))?;
        let extension = extension_for_content_type(url, content_type)?;
        let stem = asset_file_stem(url)?;

        let file_name = self.claims.claim(id, stem, extension);
        let path = self.output_dir.join(&file_name);
        let bytes = match asset.save_to(&path).await {
            Ok(bytes) => bytes,
            Err(error) => {
                self.claims.release(id, &file_name);
                return Err(error);
            }
        };

        Ok(SavedAsset {
            path,
            bytes,
            extension,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        let success = DownloadOutcome::Success {
            path: PathBuf::from("a.png"),
            bytes: 3,
            extension: ".png",
            attempts: 2,
        };
        assert!(success.is_success());
        assert_eq!(success.attempts(), 2);

        let failed = DownloadOutcome::Failed {
            error: DownloadError::no_asset_link(ScreenshotId::new(1)),
            attempts: 1,
        };
        assert!(!failed.is_success());
        assert_eq!(failed.attempts(), 1);
    }
}
