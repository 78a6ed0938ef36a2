//! HTML fragments shaped like the community site's pages.

#![allow(dead_code)]

/// A grid page linking to each of `ids`.
#[must_use]
pub fn listing_page(ids: &[u64]) -> String {
    let mut html = String::from("<html><body><div class=\"grid\">\n");
    for id in ids {
        html.push_str(&format!(
            "<a href=\"https://steamcommunity.com/sharedfiles/filedetails/?id={id}\" class=\"profile_media_item\"></a>\n"
        ));
    }
    html.push_str("</div></body></html>");
    html
}

/// A detail page whose full-size link points at `{asset_host}/ugc/{stem}/{hash}/`.
#[must_use]
pub fn detail_page(asset_host: &str, stem: &str, hash: &str) -> String {
    format!(
        "<html><body><div class=\"actualmediactn\">\
         <a href=\"{asset_host}/ugc/{stem}/{hash}/\" target=\"_blank\"><img src=\"preview.jpg\"></a>\
         </div></body></html>"
    )
}

/// Path the asset for `stem`/`hash` is served from.
#[must_use]
pub fn asset_path(stem: &str, hash: &str) -> String {
    format!("/ugc/{stem}/{hash}/")
}
