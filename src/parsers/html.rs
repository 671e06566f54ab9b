use crate::results::LinkRecord;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

/// Anchors whose `rel` attribute carries the `bookmark` token
static BOOKMARK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[rel~="bookmark"]"#).expect("static selector"));

/// Extracts bookmark links from HTML content
///
/// Anchors are taken in document order and capped at `limit`. Anchors without a
/// usable `href` are skipped and do not count towards the cap. Relative hrefs are
/// resolved against `base_url`.
pub fn extract_bookmarks(html: &str, base_url: &Url, limit: usize) -> Vec<LinkRecord> {
    if html.trim().is_empty() {
        return Vec::new();
    }

    let doc = Html::parse_document(html);
    let links = doc
        .select(&BOOKMARK_SELECTOR)
        .filter_map(|anchor| to_record(anchor, base_url))
        .take(limit)
        .collect::<Vec<_>>();

    ::log::debug!("HTML parser found {} bookmark links in {}", links.len(), base_url);
    links
}

fn to_record(anchor: ElementRef<'_>, base_url: &Url) -> Option<LinkRecord> {
    let href = anchor.value().attr("href")?.trim();
    if href.is_empty() {
        return None;
    }

    let resolved = match base_url.join(href) {
        Ok(url) => url,
        Err(e) => {
            ::log::debug!("Skipping unresolvable href {:?} on {}: {}", href, base_url, e);
            return None;
        }
    };

    Some(LinkRecord::new(
        resolved.to_string(),
        visible_text(anchor),
        anchor.value().attr("title").unwrap_or_default(),
        base_url.as_str(),
    ))
}

/// Text content of an element with whitespace collapsed
fn visible_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
