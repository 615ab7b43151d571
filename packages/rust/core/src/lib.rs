//! Core pipeline and context assembly for SiteContext.
//!
//! This crate ties crawling and context assembly into one end-to-end
//! workflow: target URL → crawl → bounded context block.

pub mod context;
pub mod pipeline;
pub mod target;

pub use context::{PAGE_DELIMITER_PREFIX, build_context};
pub use pipeline::{
    PipelineConfig, ProgressReporter, SilentProgress, SiteContext, build_site_context,
};
pub use sitecontext_crawler::CrawlProgress;
pub use target::normalize_target;
