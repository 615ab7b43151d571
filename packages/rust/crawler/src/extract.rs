//! Structural content extraction: title, description, heading outline, body text.
//!
//! Extraction is a pure transform over the parsed document. The HTML5 parser
//! recovers from any malformed input, so every field degrades to an empty
//! value instead of failing.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use sitecontext_shared::{ExtractLimits, PageRecord, collapse_whitespace, truncate_chars};

/// Elements removed before any text is read.
const NON_CONTENT: &str = "script, style, noscript, nav, footer, header, aside, iframe, svg";

/// Heading levels that make up the outline.
const OUTLINE_LEVELS: [u8; 3] = [1, 2, 3];

static NON_CONTENT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(NON_CONTENT).expect("valid selector"));
static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static META_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta").expect("valid selector"));
static HEADING_SELS: LazyLock<[Selector; 3]> = LazyLock::new(|| {
    OUTLINE_LEVELS.map(|level| Selector::parse(&format!("h{level}")).expect("valid selector"))
});

/// Parse `markup` fetched from `url` into a [`PageRecord`] bounded by `limits`.
pub fn extract(markup: &str, url: &str, limits: &ExtractLimits) -> PageRecord {
    let mut doc = Html::parse_document(markup);
    strip_non_content(&mut doc);

    let title = resolve_title(&doc);
    let meta_description = resolve_meta_description(&doc);
    let headings = heading_outline(&doc, limits);
    let body = collapse_whitespace(doc.root_element().text());

    PageRecord {
        url: url.to_string(),
        title: truncate_chars(&title, limits.title_chars).to_string(),
        meta_description: truncate_chars(&meta_description, limits.meta_description_chars)
            .to_string(),
        headings,
        body: truncate_chars(&body, limits.body_chars).to_string(),
    }
}

/// Detach scripts, styles and page chrome from the tree.
fn strip_non_content(doc: &mut Html) {
    let ids: Vec<_> = doc.select(&NON_CONTENT_SEL).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Text nodes are joined without separators, then whitespace is collapsed.
fn element_text(el: ElementRef<'_>) -> String {
    let joined: String = el.text().collect();
    collapse_whitespace([joined.as_str()])
}

/// `<title>`, falling back to the first `<h1>` when the title is missing or blank.
fn resolve_title(doc: &Html) -> String {
    let root = doc.root_element();
    let title = root.select(&TITLE_SEL).next().map(element_text).unwrap_or_default();
    if !title.is_empty() {
        return title;
    }

    root.select(&HEADING_SELS[0])
        .next()
        .map(element_text)
        .unwrap_or_default()
}

/// Content of the first `description` / `og:description` meta tag.
fn resolve_meta_description(doc: &Html) -> String {
    doc.root_element()
        .select(&META_SEL)
        .find(|el| {
            let attr = |name| el.value().attr(name).unwrap_or("").to_ascii_lowercase();
            let name = attr("name");
            name == "description"
                || name == "og:description"
                || attr("property") == "og:description"
        })
        .and_then(|el| el.value().attr("content"))
        .map(|content| collapse_whitespace([content]))
        .unwrap_or_default()
}

/// `[H1] text` entries: every H1, then every H2, then every H3, in document order.
fn heading_outline(doc: &Html, limits: &ExtractLimits) -> Vec<String> {
    OUTLINE_LEVELS
        .iter()
        .zip(HEADING_SELS.iter())
        .flat_map(move |(level, sel)| {
            doc.root_element().select(sel).filter_map(move |el| {
                let text = element_text(el);
                (text.chars().count() > limits.min_heading_chars)
                    .then(|| format!("[H{level}] {text}"))
            })
        })
        .take(limits.max_headings)
        .collect()
}
