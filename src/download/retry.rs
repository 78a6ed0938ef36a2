//! Retry logic with linear backoff for page fetches and asset downloads.
//!
//! This module provides the [`RetryPolicy`] and [`FailureType`] types for
//! classifying errors and determining retry behavior.
//!
//! # Overview
//!
//! When an operation fails, the error is classified into a [`FailureType`]:
//! - [`FailureType::Transient`] - Network, server and disk failures that may succeed on retry
//! - [`FailureType::Permanent`] - Structural failures the server will repeat on every attempt
//!
//! The [`RetryPolicy`] then determines whether to retry based on failure type
//! and attempt count. The wait grows linearly: the delay after attempt `n`
//! is `delay_unit * n`.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use screenshot_downloader::download::{
//!     DownloadError, RetryPolicy, RetryDecision, classify_error
//! };
//!
//! let policy = RetryPolicy::new(3, Duration::from_secs(3));
//! let error = DownloadError::http_status("https://example.com/page", 503);
//!
//! match policy.should_retry(classify_error(&error), 1) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         assert_eq!(delay, Duration::from_secs(3));
//!         assert_eq!(attempt, 2);
//!     }
//!     RetryDecision::DoNotRetry { reason } => panic!("unexpected: {reason}"),
//! }
//! ```

use std::time::Duration;

use tracing::{debug, instrument};

use super::DownloadError;
use super::constants::DOWNLOAD_RETRY_DELAY_UNIT;

/// Default maximum attempts per screenshot (including the first).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Classification of failure types.
///
/// Used to determine whether a failed operation should be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Temporary failure that may succeed on retry.
    ///
    /// Examples: timeout, connection refused, non-2xx status, disk write error.
    Transient,

    /// Failure that will repeat on every attempt.
    ///
    /// Examples: detail page without an image link, unsupported content type.
    Permanent,
}

/// Decision on whether to retry a failed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Do not retry.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Bounded retry configuration with linear backoff.
///
/// # Default Values
///
/// - `max_attempts`: 3
/// - `delay_unit`: 3 seconds
///
/// With defaults, a screenshot waits 3s after its first failure and 6s after
/// its second, and is given up after the third.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Delay multiplied by the failed attempt number.
    delay_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_unit: DOWNLOAD_RETRY_DELAY_UNIT,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy.
    ///
    /// `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, delay_unit: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay_unit,
        }
    }

    /// Creates a policy with a custom `max_attempts`, using the default delay unit.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the backoff unit.
    #[must_use]
    pub fn delay_unit(&self) -> Duration {
        self.delay_unit
    }

    /// Determines whether to retry a failed operation.
    ///
    /// # Arguments
    ///
    /// * `failure_type` - Classification of the failure
    /// * `attempt` - The attempt number that just failed (1-indexed)
    #[instrument(skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, failure_type: FailureType, attempt: u32) -> RetryDecision {
        if failure_type == FailureType::Permanent {
            return RetryDecision::DoNotRetry {
                reason: "permanent failure - retry would not help".to_string(),
            };
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = self.delay_unit.saturating_mul(attempt);

        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }
}

/// Classifies an error into a failure type for retry decisions.
///
/// | Error | Type |
/// |-------|------|
/// | Network, Timeout, HttpStatus | Transient |
/// | Io | Transient |
/// | NoAssetLink | Permanent |
/// | UnsupportedContentType, MissingContentType | Permanent |
/// | InvalidUrl, InvalidAssetUrl | Permanent |
#[instrument]
pub fn classify_error(error: &DownloadError) -> FailureType {
    match error {
        DownloadError::Network { .. }
        | DownloadError::Timeout { .. }
        | DownloadError::HttpStatus { .. }
        | DownloadError::Io { .. } => FailureType::Transient,

        DownloadError::NoAssetLink { .. }
        | DownloadError::UnsupportedContentType { .. }
        | DownloadError::MissingContentType { .. }
        | DownloadError::InvalidUrl { .. }
        | DownloadError::InvalidAssetUrl { .. } => FailureType::Permanent,
    }
}
