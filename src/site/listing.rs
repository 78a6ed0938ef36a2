//! Listing page fetcher: one profile grid page in, screenshot identifiers out.

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{LISTING_ID_RE, ListingSource, SiteEndpoints};
use crate::download::{DownloadError, HttpClient};
use crate::screenshot::{ProfileId, ScreenshotId};

/// Fetches profile listing pages over HTTP.
#[derive(Debug, Clone)]
pub struct ListingFetcher {
    client: HttpClient,
    endpoints: SiteEndpoints,
}

impl ListingFetcher {
    /// Creates a fetcher for the given endpoints.
    #[must_use]
    pub fn new(client: HttpClient, endpoints: SiteEndpoints) -> Self {
        Self { client, endpoints }
    }
}

#[async_trait]
impl ListingSource for ListingFetcher {
    #[instrument(skip(self), fields(profile = %profile))]
    async fn fetch_page(
        &self,
        profile: ProfileId,
        page: u32,
    ) -> Result<Vec<ScreenshotId>, DownloadError> {
        let url = self.endpoints.listing_url(profile, page);
        let html = self.client.fetch_text(&url).await?;
        let ids = extract_screenshot_ids(&html);
        debug!(page, found = ids.len(), "listing page parsed");
        Ok(ids)
    }
}

/// Extracts every screenshot identifier linked from a listing page, in document order.
///
/// Duplicates are kept; deduplication happens once the whole scan is done.
/// Matches that do not fit in a `u64` are skipped.
#[must_use]
pub fn extract_screenshot_ids(html: &str) -> Vec<ScreenshotId> {
    LISTING_ID_RE
        .captures_iter(html)
        .filter_map(|caps| {
            let raw = caps.get(1)?.as_str();
            match raw.parse::<u64>() {
                Ok(value) => Some(ScreenshotId::new(value)),
                Err(error) => {
                    debug!(raw, %error, "skipping unparseable screenshot id");
                    None
                }
            }
        })
        .collect()
}
