//! File naming for downloaded screenshots.
//!
//! A screenshot's file name is the `ugc/<segment>/` path segment of its asset
//! URL followed by the extension mapped from the response's Content-Type.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::warn;

use super::error::DownloadError;
use crate::screenshot::ScreenshotId;

/// Path prefix that precedes the unique segment in asset URLs.
const ASSET_SEGMENT_PREFIX: &str = "ugc/";

/// Content types the site serves screenshots as, with their file extensions.
const EXTENSION_TABLE: [(&str, &str); 4] = [
    ("image/jpeg", ".jpg"),
    ("image/png", ".png"),
    ("image/gif", ".gif"),
    ("image/webp", ".webp"),
];

/// Maps a Content-Type header value to a file extension.
///
/// Parameters (`; charset=...`) are ignored and matching is case-insensitive.
///
/// # Errors
///
/// Returns [`DownloadError::UnsupportedContentType`] when the type is not an
/// image format the site is known to serve.
pub fn extension_for_content_type(
    url: &str,
    content_type: &str,
) -> Result<&'static str, DownloadError> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    EXTENSION_TABLE
        .iter()
        .find(|(known, _)| *known == mime)
        .map(|(_, extension)| *extension)
        .ok_or_else(|| DownloadError::unsupported_content_type(url, content_type))
}

/// Extracts the unique path segment between `ugc/` and the next `/` of an asset URL.
///
/// `https://host/ugc/123456789/ABCDEF/` yields `123456789`.
///
/// # Errors
///
/// Returns [`DownloadError::InvalidAssetUrl`] when the prefix or the closing
/// separator is missing, or the segment is empty.
pub fn asset_file_stem(url: &str) -> Result<&str, DownloadError> {
    let start = url
        .find(ASSET_SEGMENT_PREFIX)
        .map(|pos| pos + ASSET_SEGMENT_PREFIX.len())
        .ok_or_else(|| DownloadError::invalid_asset_url(url))?;
    let rest = &url[start..];
    let end = rest
        .find('/')
        .ok_or_else(|| DownloadError::invalid_asset_url(url))?;
    let stem = &rest[..end];
    if stem.is_empty() || stem.contains(['\\', '.', '?', '#']) {
        return Err(DownloadError::invalid_asset_url(url));
    }
    Ok(stem)
}

/// Per-run record of which screenshot claimed each derived file name.
///
/// The site gives each asset a unique segment, so claims normally never
/// clash. When two screenshots do derive the same name, the second one gets
/// a `-<id>` suffix instead of overwriting the first one's file.
#[derive(Debug, Default)]
pub struct FileNameClaims {
    claims: DashMap<String, ScreenshotId>,
}

impl FileNameClaims {
    /// Creates an empty claim table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `stem + extension` for `id` and returns the file name to write.
    ///
    /// Re-claiming by the same screenshot (a retried attempt) returns the same
    /// name. Suffixed names go through the same table, so a name already held
    /// by another screenshot is never handed out twice.
    pub fn claim(&self, id: ScreenshotId, stem: &str, extension: &str) -> String {
        let preferred = format!("{stem}{extension}");
        let mut round = 0u32;
        loop {
            let candidate = match round {
                0 => preferred.clone(),
                1 => format!("{stem}-{id}{extension}"),
                n => format!("{stem}-{id}-{n}{extension}"),
            };
            match self.claims.entry(candidate.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(id);
                    if round > 0 {
                        warn!(
                            screenshot = %id,
                            file = %preferred,
                            renamed = %candidate,
                            "file name already claimed by another screenshot"
                        );
                    }
                    return candidate;
                }
                Entry::Occupied(owner) if *owner.get() == id => return candidate,
                Entry::Occupied(_) => round += 1,
            }
        }
    }

    /// Gives `name` back if `id` holds it, so a failed write does not keep it reserved.
    pub fn release(&self, id: ScreenshotId, name: &str) {
        self.claims.remove_if(name, |_, owner| *owner == id);
    }

    /// Number of file names claimed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Returns true when nothing has been claimed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- extension_for_content_type ---

    #[test]
    fn test_extension_for_png() {
        assert_eq!(extension_for_content_type("u", "image/png").unwrap(), ".png");
    }

    #[test]
    fn test_extension_for_every_known_type() {
        assert_eq!(extension_for_content_type("u", "image/jpeg").unwrap(), ".jpg");
        assert_eq!(extension_for_content_type("u", "image/gif").unwrap(), ".gif");
        assert_eq!(extension_for_content_type("u", "image/webp").unwrap(), ".webp");
    }

    #[test]
    fn test_extension_strips_parameters_and_case() {
        assert_eq!(
            extension_for_content_type("u", "Image/JPEG; charset=binary").unwrap(),
            ".jpg"
        );
    }

    #[test]
    fn test_extension_unknown_type_is_error() {
        let err = extension_for_content_type("https://host/ugc/1/A/", "text/html").unwrap_err();
        assert!(matches!(
            err,
            DownloadError::UnsupportedContentType { ref content_type, .. } if content_type == "text/html"
        ));
    }

    // --- asset_file_stem ---

    #[test]
    fn test_asset_file_stem_takes_segment_after_ugc() {
        let stem = asset_file_stem("https://host/ugc/123456789/ABCDEF.png").unwrap();
        assert_eq!(stem, "123456789");
    }

    #[test]
    fn test_asset_file_stem_with_trailing_slash_layout() {
        let stem = asset_file_stem(
            "https://steamuserimages-a.akamaihd.net/ugc/1016067353459178322/8D13E1F4B8D7CB0A/",
        )
        .unwrap();
        assert_eq!(stem, "1016067353459178322");
    }

    #[test]
    fn test_asset_file_stem_missing_prefix() {
        assert!(asset_file_stem("https://host/images/1/2/").is_err());
    }

    #[test]
    fn test_asset_file_stem_missing_terminator() {
        assert!(asset_file_stem("https://host/ugc/123").is_err());
    }

    #[test]
    fn test_asset_file_stem_rejects_traversal() {
        assert!(asset_file_stem("https://host/ugc/../etc/").is_err());
        assert!(asset_file_stem("https://host/ugc//x/").is_err());
    }

    // --- FileNameClaims ---

    #[test]
    fn test_claims_first_owner_keeps_name() {
        let claims = FileNameClaims::new();
        let name = claims.claim(ScreenshotId::new(1), "100", ".png");
        assert_eq!(name, "100.png");
        assert_eq!(claims.len(), 1);
    }

    #[test]
    fn test_claims_same_owner_is_stable() {
        let claims = FileNameClaims::new();
        let first = claims.claim(ScreenshotId::new(1), "100", ".png");
        let again = claims.claim(ScreenshotId::new(1), "100", ".png");
        assert_eq!(first, again);
        assert_eq!(claims.len(), 1);
    }

    #[test]
    fn test_claims_collision_gets_suffix() {
        let claims = FileNameClaims::new();
        claims.claim(ScreenshotId::new(1), "100", ".png");
        let second = claims.claim(ScreenshotId::new(2), "100", ".png");
        assert_eq!(second, "100-2.png");
        let second_again = claims.claim(ScreenshotId::new(2), "100", ".png");
        assert_eq!(second_again, "100-2.png");
    }

    #[test]
    fn test_claims_suffixed_name_never_steals_existing_claim() {
        let claims = FileNameClaims::new();
        let own = claims.claim(ScreenshotId::new(7), "100-2", ".png");
        let first = claims.claim(ScreenshotId::new(1), "100", ".png");
        let second = claims.claim(ScreenshotId::new(2), "100", ".png");

        assert_eq!(own, "100-2.png");
        assert_eq!(first, "100.png");
        assert_eq!(second, "100-2-2.png");
        assert_ne!(own, second);
        assert_eq!(claims.claim(ScreenshotId::new(7), "100-2", ".png"), "100-2.png");
        assert_eq!(claims.claim(ScreenshotId::new(2), "100", ".png"), "100-2-2.png");
    }

    #[test]
    fn test_released_name_goes_to_next_claimant() {
        let claims = FileNameClaims::new();
        claims.claim(ScreenshotId::new(1), "100", ".png");
        claims.release(ScreenshotId::new(1), "100.png");
        assert!(claims.is_empty());

        assert_eq!(claims.claim(ScreenshotId::new(2), "100", ".png"), "100.png");
    }

    #[test]
    fn test_release_by_other_screenshot_is_ignored() {
        let claims = FileNameClaims::new();
        claims.claim(ScreenshotId::new(1), "100", ".png");
        claims.release(ScreenshotId::new(2), "100.png");
        assert_eq!(claims.claim(ScreenshotId::new(2), "100", ".png"), "100-2.png");
    }
}
