//! Fetching, extraction, link discovery and crawl orchestration.
//!
//! This crate provides:
//! - [`fetch`] - HTTP fetcher with timeout, browser identification and private-host guard
//! - [`extract`] - markup → [`PageRecord`](sitecontext_shared::PageRecord)
//! - [`links`] - same-origin link discovery
//! - [`plan`] - relevance policy and crawl plan
//! - [`engine`] - sequential crawl of a start page plus a few related pages

pub mod engine;
pub mod extract;
pub mod fetch;
pub mod links;
pub mod plan;

pub use engine::{CandidateOutcome, CrawlOutcome, CrawlProgress, Crawler, SilentCrawlProgress};
pub use extract::extract;
pub use fetch::{FetchedMarkup, Fetcher};
pub use links::{
    LinkSkip, LinkVerdict, discover_links, same_origin, scan_links, without_query_and_fragment,
};
pub use plan::{CrawlPlan, RelevancePolicy};
