//! Constants for the download module (timeouts, retry schedule, concurrency).

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP request timeout (5 minutes, covers large asset bodies).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Backoff unit between asset download attempts (attempt `n` waits `n` units).
pub const DOWNLOAD_RETRY_DELAY_UNIT: Duration = Duration::from_secs(3);

/// Suffix for in-progress writes; renamed into place on completion.
pub const PARTIAL_FILE_SUFFIX: &str = ".part";
