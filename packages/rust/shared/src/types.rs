//! Core domain types for crawled pages and their size limits.

use serde::{Deserialize, Serialize};

use crate::error::FetchErrorKind;

// ---------------------------------------------------------------------------
// PageRecord
// ---------------------------------------------------------------------------

/// Readable content extracted from one fetched page.
///
/// All string fields are plain text with collapsed whitespace, already cut to
/// the [`ExtractLimits`] in effect when the page was extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Absolute URL the content was served from (after redirects).
    pub url: String,
    /// `<title>`, or the first `<h1>` when the title is missing or blank.
    pub title: String,
    /// `description` / `og:description` meta content.
    pub meta_description: String,
    /// `[H1] text`-style outline entries, level-major.
    pub headings: Vec<String>,
    /// Visible body text.
    pub body: String,
}

// ---------------------------------------------------------------------------
// SkippedPage
// ---------------------------------------------------------------------------

/// A secondary page that was planned but could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPage {
    /// The candidate URL.
    pub url: String,
    /// Why the fetch failed.
    pub reason: FetchErrorKind,
}

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Per-field caps applied by the extractor. Lengths are in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractLimits {
    #[serde(default = "default_title_chars")]
    pub title_chars: usize,
    #[serde(default = "default_meta_description_chars")]
    pub meta_description_chars: usize,
    /// Maximum number of outline entries kept.
    #[serde(default = "default_max_headings")]
    pub max_headings: usize,
    #[serde(default = "default_body_chars")]
    pub body_chars: usize,
    /// Headings must be strictly longer than this to be kept.
    #[serde(default = "default_min_heading_chars")]
    pub min_heading_chars: usize,
}

impl Default for ExtractLimits {
    fn default() -> Self {
        Self {
            title_chars: default_title_chars(),
            meta_description_chars: default_meta_description_chars(),
            max_headings: default_max_headings(),
            body_chars: default_body_chars(),
            min_heading_chars: default_min_heading_chars(),
        }
    }
}

fn default_title_chars() -> usize {
    200
}
fn default_meta_description_chars() -> usize {
    400
}
fn default_max_headings() -> usize {
    40
}
fn default_body_chars() -> usize {
    4000
}
fn default_min_heading_chars() -> usize {
    3
}

/// Per-page caps applied when assembling the context block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextLimits {
    #[serde(default = "default_headings_per_page")]
    pub headings_per_page: usize,
    #[serde(default = "default_body_chars_per_page")]
    pub body_chars_per_page: usize,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            headings_per_page: default_headings_per_page(),
            body_chars_per_page: default_body_chars_per_page(),
        }
    }
}

fn default_headings_per_page() -> usize {
    15
}
fn default_body_chars_per_page() -> usize {
    1600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_record_serialization() {
        let page = PageRecord {
            url: "https://example.com/about".into(),
            title: "About us".into(),
            meta_description: "Who we are".into(),
            headings: vec!["[H1] About us".into()],
            body: "We build things.".into(),
        };

        let json = serde_json::to_string(&page).expect("serialize");
        let parsed: PageRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, page);
    }

    #[test]
    fn skipped_page_serializes_reason() {
        let skipped = SkippedPage {
            url: "https://example.com/pricing".into(),
            reason: FetchErrorKind::Status(404),
        };
        let json = serde_json::to_value(&skipped).expect("serialize");
        assert_eq!(json["reason"]["kind"], "status");
        assert_eq!(json["reason"]["detail"], 404);
    }

    #[test]
    fn limits_defaults() {
        let extract = ExtractLimits::default();
        assert_eq!(extract.title_chars, 200);
        assert_eq!(extract.meta_description_chars, 400);
        assert_eq!(extract.max_headings, 40);
        assert_eq!(extract.body_chars, 4000);

        let context = ContextLimits::default();
        assert_eq!(context.headings_per_page, 15);
        assert_eq!(context.body_chars_per_page, 1600);
    }
}
