//! Sequential pagination scan of a profile's screenshot grid.
//!
//! The listing endpoint has no total count and no "last page" marker, so the
//! end of the grid is inferred: a run of consecutive pages with no
//! screenshots on them ends the scan. A page that keeps failing to load also
//! ends the scan, keeping whatever was found so far.
//!
//! Pages are requested strictly one at a time, in order, with a short pause
//! between them.
//!
//! # Example
//!
//! ```no_run
//! use screenshot_downloader::download::HttpClient;
//! use screenshot_downloader::scan::{PageScanner, ScanPolicy};
//! use screenshot_downloader::site::{ListingFetcher, SiteEndpoints};
//! use screenshot_downloader::ProfileId;
//!
//! # async fn example() {
//! let fetcher = ListingFetcher::new(HttpClient::new(), SiteEndpoints::default());
//! let scanner = PageScanner::new(ScanPolicy::default());
//! let report = scanner.scan(&fetcher, ProfileId::new(76561197960279927)).await;
//! println!("found {} screenshots", report.len());
//! # }
//! ```

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::download::{FailureType, RetryDecision, RetryPolicy};
use crate::screenshot::{ProfileId, ScreenshotId};
use crate::site::ListingSource;

/// Failed loads of one page tolerated before the scan is abandoned.
pub const DEFAULT_MAX_PAGE_FAILURES: u32 = 3;

/// Consecutive empty pages tolerated before the grid is considered finished.
pub const DEFAULT_EMPTY_PAGE_STREAK_LIMIT: u32 = 3;

/// Backoff unit between failed loads of the same page.
const DEFAULT_PAGE_FAILURE_BACKOFF: Duration = Duration::from_secs(1);

/// Pause between consecutive page requests.
const DEFAULT_PAGE_PAUSE: Duration = Duration::from_millis(100);

/// Tuning for the page scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPolicy {
    /// Failed loads of a single page after which the scan ends.
    pub max_page_failures: u32,
    /// Consecutive empty pages after which the grid is considered finished.
    pub empty_page_streak_limit: u32,
    /// After the `n`th failure of a page, the scan waits `n` of these.
    pub failure_backoff: Duration,
    /// Pause before moving to the next page.
    pub page_pause: Duration,
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            max_page_failures: DEFAULT_MAX_PAGE_FAILURES,
            empty_page_streak_limit: DEFAULT_EMPTY_PAGE_STREAK_LIMIT,
            failure_backoff: DEFAULT_PAGE_FAILURE_BACKOFF,
            page_pause: DEFAULT_PAGE_PAUSE,
        }
    }
}

impl ScanPolicy {
    /// Per-page retry schedule: one first load plus `max_page_failures` retries.
    fn page_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_page_failures.saturating_add(1),
            self.failure_backoff,
        )
    }
}

/// Why a scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTermination {
    /// Too many consecutive empty pages; `last_page` is the last one requested.
    EndOfPages {
        /// Last page ordinal requested.
        last_page: u32,
    },
    /// `page` failed to load more than the tolerated number of times.
    PageFailuresExhausted {
        /// Page ordinal that kept failing.
        page: u32,
    },
}

/// Result of scanning a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// Deduplicated identifiers, in ascending order.
    pub screenshots: BTreeSet<ScreenshotId>,
    /// Identifiers seen across all pages, duplicates included.
    pub discovered: usize,
    /// Distinct page ordinals requested.
    pub pages_requested: u32,
    /// Listing requests made, retries included.
    pub requests_made: u32,
    /// Why the scan stopped.
    pub termination: ScanTermination,
}

impl ScanReport {
    /// Number of distinct screenshots found.
    #[must_use]
    pub fn len(&self) -> usize {
        self.screenshots.len()
    }

    /// True when the profile yielded no screenshots at all.
    ///
    /// Usually means the profile is private or has no public screenshots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.screenshots.is_empty()
    }
}

/// Drives a [`ListingSource`] page by page until the grid runs out.
#[derive(Debug, Clone, Default)]
pub struct PageScanner {
    policy: ScanPolicy,
}

/// Outcome of loading one page, after its retries.
enum PageLoad {
    Loaded(Vec<ScreenshotId>),
    Abandoned,
}

impl PageScanner {
    /// Creates a scanner with the given policy.
    #[must_use]
    pub fn new(policy: ScanPolicy) -> Self {
        Self { policy }
    }

    /// Scans every listing page of `profile`.
    ///
    /// Never fails: page errors are retried and, once exhausted, end the scan
    /// with whatever was found up to that point.
    #[instrument(skip(self, source), fields(profile = %profile))]
    pub async fn scan(&self, source: &dyn ListingSource, profile: ProfileId) -> ScanReport {
        let retry = self.policy.page_retry_policy();
        let mut screenshots = BTreeSet::new();
        let mut discovered = 0usize;
        let mut requests_made = 0u32;
        let mut empty_streak = 0u32;
        let mut page = 1u32;

        let termination = loop {
            info!(page, found = screenshots.len(), "getting page");

            let load = self
                .load_page(source, profile, page, &retry, &mut requests_made)
                .await;

            let ids = match load {
                PageLoad::Loaded(ids) => ids,
                PageLoad::Abandoned => {
                    warn!(page, "page kept failing, ending scan");
                    break ScanTermination::PageFailuresExhausted { page };
                }
            };

            if ids.is_empty() {
                empty_streak += 1;
                info!(page, empty_streak, "page didn't have any screenshots");
                if empty_streak > self.policy.empty_page_streak_limit {
                    info!(
                        last_page = page,
                        "reached the end of the screenshot pages"
                    );
                    break ScanTermination::EndOfPages { last_page: page };
                }
            } else {
                empty_streak = 0;
                discovered += ids.len();
                screenshots.extend(ids);
            }

            tokio::time::sleep(self.policy.page_pause).await;
            page += 1;
        };

        info!(
            screenshots = screenshots.len(),
            discovered,
            pages = page,
            requests = requests_made,
            ?termination,
            "scan complete"
        );

        ScanReport {
            screenshots,
            discovered,
            pages_requested: page,
            requests_made,
            termination,
        }
    }

    /// Loads one page, retrying failures on the same page with linear backoff.
    async fn load_page(
        &self,
        source: &dyn ListingSource,
        profile: ProfileId,
        page: u32,
        retry: &RetryPolicy,
        requests_made: &mut u32,
    ) -> PageLoad {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            *requests_made += 1;

            let error = match source.fetch_page(profile, page).await {
                Ok(ids) => return PageLoad::Loaded(ids),
                Err(error) => error,
            };

            // Listing failures are always retried the same way, whatever the cause.
            match retry.should_retry(FailureType::Transient, attempt) {
                RetryDecision::Retry { delay, .. } => {
                    warn!(
                        page,
                        attempt,
                        delay_ms = delay.as_millis(),
                        error = %error,
                        "page request failed, retrying in case it was a server error"
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::DoNotRetry { reason } => {
                    debug!(page, attempt, %reason, error = %error, "giving up on page");
                    return PageLoad::Abandoned;
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::download::DownloadError;

    /// Scripted page responses; every call pops the next one and records the page.
    /// Once the script runs out, every page is empty.
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<Vec<u64>, u16>>>,
        requested: Mutex<Vec<u32>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<Vec<u64>, u16>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<u32> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ListingSource for ScriptedSource {
        async fn fetch_page(
            &self,
            _profile: ProfileId,
            page: u32,
        ) -> Result<Vec<ScreenshotId>, DownloadError> {
            self.requested.lock().unwrap().push(page);
            let next = self.script.lock().unwrap().pop_front().unwrap_or(Ok(vec![]));
            next.map(|ids| ids.into_iter().map(ScreenshotId::new).collect())
                .map_err(|status| DownloadError::http_status("http://listing", status))
        }
    }

    fn fast_policy() -> ScanPolicy {
        ScanPolicy {
            failure_backoff: Duration::from_millis(1),
            page_pause: Duration::ZERO,
            ..ScanPolicy::default()
        }
    }

    fn ids(values: &[u64]) -> BTreeSet<ScreenshotId> {
        values.iter().copied().map(ScreenshotId::new).collect()
    }

    #[test]
    fn test_scan_policy_defaults() {
        let policy = ScanPolicy::default();
        assert_eq!(policy.max_page_failures, 3);
        assert_eq!(policy.empty_page_streak_limit, 3);
        assert_eq!(policy.failure_backoff, Duration::from_secs(1));
        assert_eq!(policy.page_retry_policy().max_attempts(), 4);
    }

    #[tokio::test]
    async fn test_four_failures_on_one_page_abandon_scan() {
        let source = ScriptedSource::new(vec![
            Ok(vec![1, 2]),
            Err(503),
            Err(503),
            Err(503),
            Err(503),
            Ok(vec![3]),
        ]);
        let scanner = PageScanner::new(fast_policy());

        let report = scanner.scan(&source, ProfileId::new(1)).await;

        assert_eq!(
            report.termination,
            ScanTermination::PageFailuresExhausted { page: 2 }
        );
        assert_eq!(source.requested(), vec![1, 2, 2, 2, 2]);
        assert_eq!(report.screenshots, ids(&[1, 2]));
        assert_eq!(report.requests_made, 5);
    }

    #[tokio::test]
    async fn test_three_failures_then_success_continues() {
        let source = ScriptedSource::new(vec![
            Err(500),
            Err(500),
            Err(500),
            Ok(vec![10]),
        ]);
        let scanner = PageScanner::new(fast_policy());

        let report = scanner.scan(&source, ProfileId::new(1)).await;

        assert_eq!(report.screenshots, ids(&[10]));
        assert!(matches!(report.termination, ScanTermination::EndOfPages { .. }));
        assert_eq!(&source.requested()[..4], &[1, 1, 1, 1]);
    }

    #[tokio::test]
    async fn test_four_empty_pages_end_scan() {
        let source = ScriptedSource::new(vec![
            Ok(vec![1, 2]),
            Ok(vec![2, 3]),
            Ok(vec![]),
            Ok(vec![]),
            Ok(vec![]),
            Ok(vec![]),
            Ok(vec![99]),
        ]);
        let scanner = PageScanner::new(fast_policy());

        let report = scanner.scan(&source, ProfileId::new(1)).await;

        assert_eq!(report.termination, ScanTermination::EndOfPages { last_page: 6 });
        assert_eq!(report.screenshots, ids(&[1, 2, 3]));
        assert_eq!(report.discovered, 4);
        assert_eq!(source.requested(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(report.pages_requested, 6);
    }

    #[tokio::test]
    async fn test_productive_page_resets_empty_streak() {
        let source = ScriptedSource::new(vec![
            Ok(vec![1]),
            Ok(vec![]),
            Ok(vec![]),
            Ok(vec![]),
            Ok(vec![2]),
        ]);
        let scanner = PageScanner::new(fast_policy());

        let report = scanner.scan(&source, ProfileId::new(1)).await;

        assert_eq!(report.screenshots, ids(&[1, 2]));
        assert_eq!(report.termination, ScanTermination::EndOfPages { last_page: 9 });
    }

    #[tokio::test]
    async fn test_duplicates_across_pages_collapse() {
        let source = ScriptedSource::new(vec![Ok(vec![5, 5, 7]), Ok(vec![5, 9])]);
        let scanner = PageScanner::new(fast_policy());

        let report = scanner.scan(&source, ProfileId::new(1)).await;

        assert_eq!(report.screenshots, ids(&[5, 7, 9]));
        assert_eq!(report.discovered, 5);
    }

    #[tokio::test]
    async fn test_private_profile_yields_empty_report() {
        let source = ScriptedSource::new(vec![]);
        let scanner = PageScanner::new(fast_policy());

        let report = scanner.scan(&source, ProfileId::new(1)).await;

        assert!(report.is_empty());
        assert_eq!(report.termination, ScanTermination::EndOfPages { last_page: 4 });
    }

    #[tokio::test]
    async fn test_failure_does_not_count_as_empty_page() {
        let source = ScriptedSource::new(vec![
            Ok(vec![1]),
            Ok(vec![]),
            Err(502),
            Ok(vec![]),
            Ok(vec![]),
            Ok(vec![]),
        ]);
        let scanner = PageScanner::new(fast_policy());

        let report = scanner.scan(&source, ProfileId::new(1)).await;

        // Page 3 fails once and then loads empty: the streak is 2, not 3.
        assert_eq!(source.requested(), vec![1, 2, 3, 3, 4, 5]);
        assert_eq!(report.termination, ScanTermination::EndOfPages { last_page: 5 });
    }
}
