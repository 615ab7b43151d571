//! Same-origin link discovery.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::trace;
use url::Url;

static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Why an anchor did not produce a crawl candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkSkip {
    /// Nothing left after dropping the fragment and query string.
    Empty,
    /// The href could not be resolved against the base URL.
    Unresolvable(String),
    /// Resolved to a different scheme, host or port.
    CrossOrigin,
    /// Resolved to the page being scanned.
    SelfLink,
    /// Already accepted earlier on the same page.
    Duplicate,
}

/// Per-anchor outcome of a link scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkVerdict {
    Accepted(Url),
    Skipped { href: String, reason: LinkSkip },
}

/// Classify every `<a href>` in `markup` relative to `base`.
pub fn scan_links(markup: &str, base: &Url) -> Vec<LinkVerdict> {
    let doc = Html::parse_document(markup);
    let page = without_query_and_fragment(base);
    let mut seen = HashSet::new();

    doc.select(&ANCHOR_SEL)
        .filter_map(|el| el.value().attr("href"))
        .map(|href| {
            let verdict = classify(href, base, &page, &mut seen);
            if let LinkVerdict::Skipped { href, reason } = &verdict {
                trace!(href = %href, ?reason, "link skipped");
            }
            verdict
        })
        .collect()
}

/// Deduplicated same-origin links found in `markup`, in first-seen order.
///
/// Never contains `base` itself. Unresolvable hrefs are dropped.
pub fn discover_links(markup: &str, base: &Url) -> Vec<Url> {
    scan_links(markup, base)
        .into_iter()
        .filter_map(|verdict| match verdict {
            LinkVerdict::Accepted(url) => Some(url),
            LinkVerdict::Skipped { .. } => None,
        })
        .collect()
}

fn classify(href: &str, base: &Url, page: &Url, seen: &mut HashSet<Url>) -> LinkVerdict {
    let skip = |reason| LinkVerdict::Skipped {
        href: href.to_string(),
        reason,
    };

    let trimmed = strip_href_suffixes(href).trim();
    if trimmed.is_empty() {
        return skip(LinkSkip::Empty);
    }

    let resolved = match base.join(trimmed) {
        Ok(url) => url,
        Err(e) => return skip(LinkSkip::Unresolvable(e.to_string())),
    };

    if !same_origin(&resolved, base) {
        skip(LinkSkip::CrossOrigin)
    } else if resolved == *page {
        skip(LinkSkip::SelfLink)
    } else if !seen.insert(resolved.clone()) {
        skip(LinkSkip::Duplicate)
    } else {
        LinkVerdict::Accepted(resolved)
    }
}

/// Drop `#fragment` first, then `?query`.
fn strip_href_suffixes(href: &str) -> &str {
    let href = href.split('#').next().unwrap_or_default();
    href.split('?').next().unwrap_or_default()
}

/// `url` with its query string and fragment removed.
pub fn without_query_and_fragment(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url.set_query(None);
    url
}

/// Same scheme, host and port.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}
