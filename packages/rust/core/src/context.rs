//! Context block assembly.
//!
//! Serializes crawled pages into the single text block handed to a
//! text-generation service. One section per page, in crawl order:
//!
//! ```text
//! --- PAGE: https://example.com/ ---
//! Title: Example
//! Meta: An example site
//! Headings:
//! [H1] Welcome
//! Content:
//! Example body text...
//! ```

use sitecontext_shared::{ContextLimits, PageRecord, truncate_chars};

/// Start of the delimiter line opening each page section.
pub const PAGE_DELIMITER_PREFIX: &str = "--- PAGE: ";

/// Shown in place of the heading list when a page has none.
const NO_HEADINGS: &str = "—";

/// Build the context block for `pages`. Empty input gives an empty string.
pub fn build_context(pages: &[PageRecord], limits: &ContextLimits) -> String {
    pages
        .iter()
        .map(|page| page_section(page, limits))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn page_section(page: &PageRecord, limits: &ContextLimits) -> String {
    let headings = page
        .headings
        .iter()
        .take(limits.headings_per_page)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n");
    let headings = if headings.is_empty() {
        NO_HEADINGS
    } else {
        headings.as_str()
    };

    format!(
        "{PAGE_DELIMITER_PREFIX}{url} ---\n\
         Title: {title}\n\
         Meta: {meta}\n\
         Headings:\n{headings}\n\
         Content:\n{body}",
        url = page.url,
        title = page.title,
        meta = page.meta_description,
        body = truncate_chars(&page.body, limits.body_chars_per_page),
    )
}
