//! End-to-end pipeline: target URL → crawl → context block.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

use sitecontext_crawler::{CrawlProgress, Crawler};
use sitecontext_shared::{AppConfig, ContextLimits, CrawlConfig, PageRecord, Result, SkippedPage};

use crate::context::build_context;
use crate::target::normalize_target;

/// Configuration for [`build_site_context`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Crawl budget, HTTP behaviour and extraction caps.
    pub crawl: CrawlConfig,
    /// Context block caps.
    pub context: ContextLimits,
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            crawl: CrawlConfig::from(config),
            context: config.context,
        }
    }
}

/// Result of the pipeline: the context block plus crawl bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct SiteContext {
    /// Normalized start URL.
    pub start_url: String,
    /// The assembled context block.
    pub context: String,
    /// Number of pages that made it into the context.
    pub pages_crawled: usize,
    /// The extracted pages, start page first.
    pub pages: Vec<PageRecord>,
    /// Secondary pages that failed to fetch.
    pub skipped: Vec<SkippedPage>,
    /// When the crawl finished.
    pub crawled_at: DateTime<Utc>,
    /// Crawl duration in milliseconds.
    pub duration_ms: u64,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: CrawlProgress {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &SiteContext);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl CrawlProgress for SilentProgress {
    fn page_fetched(&self, _url: &str, _current: usize, _total: usize) {}
    fn page_skipped(&self, _skipped: &SkippedPage) {}
}

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _result: &SiteContext) {}
}

/// Crawl the site at `target` and assemble its context block.
///
/// 1. Normalize the target (scheme-less input becomes `https://`)
/// 2. Crawl the start page and a few related same-origin pages
/// 3. Build the bounded context block
///
/// Fails only on invalid input or when the start page cannot be fetched.
#[instrument(skip_all, fields(target = %target))]
pub async fn build_site_context(
    target: &str,
    config: &PipelineConfig,
    progress: &dyn ProgressReporter,
) -> Result<SiteContext> {
    let start_url = normalize_target(target)?;
    info!(%start_url, "building site context");

    progress.phase("Crawling site");
    let crawler = Crawler::new(config.crawl.clone())?;
    let outcome = crawler.crawl_with_progress(&start_url, progress).await?;

    progress.phase("Assembling context");
    let context = build_context(&outcome.pages, &config.context);

    let result = SiteContext {
        start_url: start_url.to_string(),
        pages_crawled: outcome.pages.len(),
        context,
        pages: outcome.pages,
        skipped: outcome.skipped,
        crawled_at: Utc::now(),
        duration_ms: outcome.duration.as_millis() as u64,
    };

    info!(
        pages_crawled = result.pages_crawled,
        pages_skipped = result.skipped.len(),
        context_chars = result.context.chars().count(),
        "site context ready"
    );
    progress.done(&result);

    Ok(result)
}
