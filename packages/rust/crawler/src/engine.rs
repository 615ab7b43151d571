//! Sequential, budget-bounded crawl of one site.
//!
//! The crawler fetches the start page, plans same-origin candidates with the
//! relevance policy, and fetches up to `max_pages` of them one at a time with
//! a pause in between. Only a start-page failure aborts the crawl.

use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};
use url::Url;

use sitecontext_shared::{CrawlConfig, FetchErrorKind, PageRecord, Result, SkippedPage};

use crate::extract::extract;
use crate::fetch::Fetcher;
use crate::links::{discover_links, same_origin, without_query_and_fragment};
use crate::plan::{CrawlPlan, RelevancePolicy};

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome of fetching one secondary candidate.
#[derive(Debug, Clone)]
pub enum CandidateOutcome {
    Fetched(PageRecord),
    Skipped(SkippedPage),
}

/// Everything one crawl produced.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Extracted pages: the start page first, then successful candidates in plan order.
    pub pages: Vec<PageRecord>,
    /// Candidates that failed to fetch, in plan order.
    pub skipped: Vec<SkippedPage>,
    /// Same-origin links discovered on the start page.
    pub links_discovered: usize,
    /// Wall-clock time of the crawl.
    pub duration: Duration,
}

/// Callbacks fired as pages complete.
pub trait CrawlProgress: Send + Sync {
    /// A page was fetched and extracted. `current` counts the start page.
    fn page_fetched(&self, url: &str, current: usize, total: usize);
    /// A secondary candidate failed and was skipped.
    fn page_skipped(&self, skipped: &SkippedPage);
}

/// No-op progress for headless/test usage.
pub struct SilentCrawlProgress;

impl CrawlProgress for SilentCrawlProgress {
    fn page_fetched(&self, _url: &str, _current: usize, _total: usize) {}
    fn page_skipped(&self, _skipped: &SkippedPage) {}
}

// ---------------------------------------------------------------------------
// Crawler
// ---------------------------------------------------------------------------

/// Crawl orchestrator: fetcher + extractor + link discovery + relevance plan.
pub struct Crawler {
    config: CrawlConfig,
    fetcher: Fetcher,
    policy: RelevancePolicy,
}

impl Crawler {
    /// Create a new crawler with the given configuration.
    pub fn new(config: CrawlConfig) -> Result<Self> {
        let fetcher = Fetcher::new(&config)?;
        let policy = RelevancePolicy::new(&config.priority_tokens);

        Ok(Self {
            config,
            fetcher,
            policy,
        })
    }

    /// Crawl `start_url` and up to `max_pages` same-origin pages.
    pub async fn crawl(&self, start_url: &Url) -> Result<CrawlOutcome> {
        self.crawl_with_progress(start_url, &SilentCrawlProgress).await
    }

    /// Like [`Crawler::crawl`], reporting each page to `progress`.
    #[instrument(skip_all, fields(start_url = %start_url))]
    pub async fn crawl_with_progress<P>(
        &self,
        start_url: &Url,
        progress: &P,
    ) -> Result<CrawlOutcome>
    where
        P: CrawlProgress + ?Sized,
    {
        let started = Instant::now();

        info!(
            max_pages = self.config.max_pages,
            delay_ms = self.config.delay.as_millis() as u64,
            "starting crawl"
        );

        // The start page is mandatory: any failure here ends the crawl.
        let start = self.fetcher.fetch(start_url).await?;
        let start_page = extract(&start.markup, start.url.as_str(), &self.config.extract);

        // After a redirect the requested URL is a link back to the start page.
        let requested = without_query_and_fragment(start_url);
        let links: Vec<Url> = discover_links(&start.markup, &start.url)
            .into_iter()
            .filter(|link| *link != requested)
            .collect();
        let links_discovered = links.len();
        let plan = CrawlPlan::build(links, &self.policy);
        debug!(
            priority = plan.priority.len(),
            rest = plan.rest.len(),
            "crawl plan built"
        );

        let candidates = plan.candidates(self.config.max_pages);
        let total = 1 + candidates.len();
        progress.page_fetched(&start_page.url, 1, total);

        let mut pages = Vec::with_capacity(total);
        pages.push(start_page);
        let mut skipped = Vec::new();

        for (i, candidate) in candidates.iter().enumerate() {
            if i > 0 && !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }

            match self.crawl_candidate(candidate, &start.url).await {
                CandidateOutcome::Fetched(page) => {
                    progress.page_fetched(&page.url, pages.len() + 1, total);
                    pages.push(page);
                }
                CandidateOutcome::Skipped(skip) => {
                    warn!(url = %skip.url, reason = %skip.reason, "skipping page");
                    progress.page_skipped(&skip);
                    skipped.push(skip);
                }
            }
        }

        let outcome = CrawlOutcome {
            pages,
            skipped,
            links_discovered,
            duration: started.elapsed(),
        };

        info!(
            pages_fetched = outcome.pages.len(),
            pages_skipped = outcome.skipped.len(),
            links_discovered,
            duration_ms = outcome.duration.as_millis() as u64,
            "crawl completed"
        );

        Ok(outcome)
    }

    /// Fetch and extract one secondary page. Never fails.
    ///
    /// Pages that end up on another origin than `start` are skipped.
    async fn crawl_candidate(&self, url: &Url, start: &Url) -> CandidateOutcome {
        match self.fetcher.fetch(url).await {
            Ok(fetched) if !same_origin(&fetched.url, start) => {
                CandidateOutcome::Skipped(SkippedPage {
                    url: url.to_string(),
                    reason: FetchErrorKind::OffOrigin(fetched.url.to_string()),
                })
            }
            Ok(fetched) => CandidateOutcome::Fetched(extract(
                &fetched.markup,
                fetched.url.as_str(),
                &self.config.extract,
            )),
            Err(e) => {
                let reason = match e.fetch_kind() {
                    Some(kind) => kind.clone(),
                    None => FetchErrorKind::Transport(e.to_string()),
                };
                CandidateOutcome::Skipped(SkippedPage {
                    url: url.to_string(),
                    reason,
                })
            }
        }
    }
}

#[cfg(test)]
mod crawler_tests {
    use std::sync::Mutex;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_config(max_pages: usize) -> CrawlConfig {
        CrawlConfig {
            max_pages,
            delay: Duration::ZERO,
            allow_private_hosts: true,
            ..CrawlConfig::default()
        }
    }

    async fn mount_page(server: &MockServer, route: &str, html: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(html.to_string()))
            .mount(server)
            .await;
    }

    fn page_html(title: &str, links: &[&str]) -> String {
        let anchors: String = links
            .iter()
            .map(|href| format!(r#"<a href="{href}">{href}</a>"#))
            .collect();
        format!(
            "<html><head><title>{title}</title></head>\
             <body><h1>{title}</h1>{anchors}</body></html>"
        )
    }

    fn paths(outcome: &CrawlOutcome) -> Vec<String> {
        outcome
            .pages
            .iter()
            .map(|p| Url::parse(&p.url).unwrap().path().to_string())
            .collect()
    }

    #[tokio::test]
    async fn start_page_without_links_yields_one_record() {
        let server = MockServer::start().await;
        mount_page(&server, "/", &page_html("Lonely", &["https://elsewhere.com/"])).await;

        let crawler = Crawler::new(test_config(3)).unwrap();
        let start = Url::parse(&server.uri()).unwrap();
        let outcome = crawler.crawl(&start).await.unwrap();

        assert_eq!(outcome.pages.len(), 1);
        assert_eq!(outcome.pages[0].title, "Lonely");
        assert_eq!(outcome.links_discovered, 0);
        assert!(outcome.skipped.is_empty());
    }

    #[tokio::test]
    async fn priority_links_are_crawled_first_within_budget() {
        let server = MockServer::start().await;
        let start_html = page_html(
            "Home",
            &["/blog", "/contact", "/pricing", "/news", "/about-us", "/jobs"],
        );
        mount_page(&server, "/", &start_html).await;
        for route in ["/blog", "/contact", "/pricing", "/news", "/about-us", "/jobs"] {
            mount_page(&server, route, &page_html(route, &[])).await;
        }

        let crawler = Crawler::new(test_config(3)).unwrap();
        let start = Url::parse(&server.uri()).unwrap();
        let outcome = crawler.crawl(&start).await.unwrap();

        assert_eq!(paths(&outcome), vec!["/", "/pricing", "/about-us", "/blog"]);
        assert_eq!(outcome.links_discovered, 6);
    }

    #[tokio::test]
    async fn failed_candidate_is_skipped_without_placeholder() {
        let server = MockServer::start().await;
        mount_page(&server, "/", &page_html("Home", &["/about", "/services", "/team"])).await;
        mount_page(&server, "/about", &page_html("About", &[])).await;
        Mock::given(path("/services"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_page(&server, "/team", &page_html("Team", &[])).await;

        let crawler = Crawler::new(test_config(3)).unwrap();
        let start = Url::parse(&server.uri()).unwrap();
        let outcome = crawler.crawl(&start).await.unwrap();

        assert_eq!(paths(&outcome), vec!["/", "/about", "/team"]);
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.skipped[0].url.ends_with("/services"));
        assert_eq!(outcome.skipped[0].reason, FetchErrorKind::Status(500));
    }

    #[tokio::test]
    async fn start_page_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(path("/"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let crawler = Crawler::new(test_config(3)).unwrap();
        let start = Url::parse(&server.uri()).unwrap();
        let err = crawler.crawl(&start).await.unwrap_err();

        assert_eq!(err.fetch_kind(), Some(&FetchErrorKind::Status(503)));
    }

    #[tokio::test]
    async fn candidates_are_not_followed_further() {
        let server = MockServer::start().await;
        mount_page(&server, "/", &page_html("Home", &["/about"])).await;
        mount_page(&server, "/about", &page_html("About", &["/deeper"])).await;
        Mock::given(path("/deeper"))
            .respond_with(ResponseTemplate::new(200).set_body_string("deep"))
            .expect(0)
            .mount(&server)
            .await;

        let crawler = Crawler::new(test_config(3)).unwrap();
        let start = Url::parse(&server.uri()).unwrap();
        let outcome = crawler.crawl(&start).await.unwrap();

        assert_eq!(paths(&outcome), vec!["/", "/about"]);
    }

    #[tokio::test]
    async fn delay_is_applied_between_secondary_fetches() {
        let server = MockServer::start().await;
        mount_page(&server, "/", &page_html("Home", &["/a", "/b", "/c"])).await;
        for route in ["/a", "/b", "/c"] {
            mount_page(&server, route, &page_html(route, &[])).await;
        }

        let config = CrawlConfig {
            delay: Duration::from_millis(50),
            ..test_config(3)
        };
        let crawler = Crawler::new(config).unwrap();
        let start = Url::parse(&server.uri()).unwrap();
        let outcome = crawler.crawl(&start).await.unwrap();

        assert_eq!(outcome.pages.len(), 4);
        // Two pauses: before the second and third candidates.
        assert!(outcome.duration >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn redirected_start_page_is_not_crawled_again() {
        let server = MockServer::start().await;
        Mock::given(path("/"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/da/"))
            .mount(&server)
            .await;
        let front = page_html("Forside", &["/", "/?lang=da", "/da/om-os"]);
        mount_page(&server, "/da/", &front).await;
        mount_page(&server, "/da/om-os", &page_html("Om os", &[])).await;

        let crawler = Crawler::new(test_config(3)).unwrap();
        let start = Url::parse(&server.uri()).unwrap();
        let outcome = crawler.crawl(&start).await.unwrap();

        assert_eq!(paths(&outcome), vec!["/da/", "/da/om-os"]);
        let front_pages = outcome.pages.iter().filter(|p| p.title == "Forside").count();
        assert_eq!(front_pages, 1);
        assert_eq!(outcome.links_discovered, 1);
    }

    #[tokio::test]
    async fn candidate_redirecting_off_origin_is_skipped() {
        let server = MockServer::start().await;
        let elsewhere = MockServer::start().await;
        mount_page(&elsewhere, "/x", &page_html("Elsewhere", &[])).await;
        mount_page(&server, "/", &page_html("Home", &["/about", "/team"])).await;
        let target = format!("{}/x", elsewhere.uri());
        Mock::given(path("/about"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", target.as_str()))
            .mount(&server)
            .await;
        mount_page(&server, "/team", &page_html("Team", &[])).await;

        let crawler = Crawler::new(test_config(3)).unwrap();
        let start = Url::parse(&server.uri()).unwrap();
        let outcome = crawler.crawl(&start).await.unwrap();

        assert_eq!(paths(&outcome), vec!["/", "/team"]);
        assert!(outcome.pages.iter().all(|p| p.title != "Elsewhere"));
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.skipped[0].url.ends_with("/about"));
        assert!(matches!(outcome.skipped[0].reason, FetchErrorKind::OffOrigin(_)));
    }

    #[derive(Default)]
    struct RecordingProgress {
        fetched: Mutex<Vec<(usize, usize)>>,
        skipped: Mutex<Vec<String>>,
    }

    impl CrawlProgress for RecordingProgress {
        fn page_fetched(&self, _url: &str, current: usize, total: usize) {
            self.fetched.lock().unwrap().push((current, total));
        }

        fn page_skipped(&self, skipped: &SkippedPage) {
            self.skipped.lock().unwrap().push(skipped.url.clone());
        }
    }

    #[tokio::test]
    async fn progress_reports_each_page() {
        let server = MockServer::start().await;
        mount_page(&server, "/", &page_html("Home", &["/about", "/gone"])).await;
        mount_page(&server, "/about", &page_html("About", &[])).await;
        Mock::given(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let crawler = Crawler::new(test_config(3)).unwrap();
        let start = Url::parse(&server.uri()).unwrap();
        let progress = RecordingProgress::default();
        crawler.crawl_with_progress(&start, &progress).await.unwrap();

        assert_eq!(*progress.fetched.lock().unwrap(), vec![(1, 3), (2, 3)]);
        assert_eq!(progress.skipped.lock().unwrap().len(), 1);
    }
}
