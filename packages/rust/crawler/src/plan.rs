//! Relevance-ordered crawl planning.
//!
//! Only a handful of secondary pages fit in a crawl, so links whose path
//! looks like an about/services/pricing style page go first.

use url::Url;

use sitecontext_shared::DEFAULT_PRIORITY_TOKENS;

/// Case-insensitive path-segment prefixes marking a link as high priority.
///
/// A URL matches when any of its path segments starts with a token, so
/// `about` matches `/about`, `/about-us` and `/company/About.html`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevancePolicy {
    tokens: Vec<String>,
}

impl RelevancePolicy {
    /// Build a policy from `tokens`. Blank tokens are ignored.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whether `url` points at a priority page.
    pub fn is_priority(&self, url: &Url) -> bool {
        let Some(segments) = url.path_segments() else {
            return false;
        };

        segments
            .map(str::to_lowercase)
            .any(|segment| self.tokens.iter().any(|t| segment.starts_with(t.as_str())))
    }
}

impl Default for RelevancePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PRIORITY_TOKENS)
    }
}

/// Same-origin candidates split by relevance, each half in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlPlan {
    pub priority: Vec<Url>,
    pub rest: Vec<Url>,
}

impl CrawlPlan {
    /// Partition `links` with `policy`.
    pub fn build(links: impl IntoIterator<Item = Url>, policy: &RelevancePolicy) -> Self {
        let (priority, rest): (Vec<Url>, Vec<Url>) = links
            .into_iter()
            .partition(|url| policy.is_priority(url));
        Self { priority, rest }
    }

    /// Priority links, then the rest, cut to `max_pages`.
    pub fn candidates(self, max_pages: usize) -> Vec<Url> {
        self.priority
            .into_iter()
            .chain(self.rest)
            .take(max_pages)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.priority.len() + self.rest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse("https://example.com/").unwrap().join(path).unwrap()
    }

    #[test]
    fn default_tokens_match_commercial_pages() {
        let policy = RelevancePolicy::default();
        for path in [
            "/about",
            "/About-Us",
            "/company/services/",
            "/products/widget",
            "/pricing.html",
            "/om-os",
            "/ydelser",
            "/Platform",
            "/solutions",
            "/why-acme",
        ] {
            assert!(policy.is_priority(&url(path)), "{path} should be priority");
        }
    }

    #[test]
    fn unrelated_pages_are_not_priority() {
        let policy = RelevancePolicy::default();
        for path in ["/", "/blog/post-1", "/contact", "/careers", "/team/lead-about"] {
            assert!(!policy.is_priority(&url(path)), "{path} should not be priority");
        }
    }

    #[test]
    fn host_does_not_count() {
        let policy = RelevancePolicy::default();
        let url = Url::parse("https://about.example.com/contact").unwrap();
        assert!(!policy.is_priority(&url));
    }

    #[test]
    fn custom_tokens_are_normalized() {
        let policy = RelevancePolicy::new(["  Team ", "", "CAREERS"]);
        assert_eq!(policy.tokens(), &["team".to_string(), "careers".to_string()]);
        assert!(policy.is_priority(&url("/careers/open")));
        assert!(!policy.is_priority(&url("/about")));
    }

    #[test]
    fn candidates_are_priority_first_and_capped() {
        let links = vec![
            url("/blog"),
            url("/contact"),
            url("/pricing"),
            url("/news"),
            url("/about"),
        ];
        let plan = CrawlPlan::build(links, &RelevancePolicy::default());
        assert_eq!(plan.priority, vec![url("/pricing"), url("/about")]);
        assert_eq!(plan.len(), 5);

        let candidates = plan.candidates(3);
        assert_eq!(candidates, vec![url("/pricing"), url("/about"), url("/blog")]);
    }

    #[test]
    fn zero_budget_yields_no_candidates() {
        let plan = CrawlPlan::build(vec![url("/about")], &RelevancePolicy::default());
        assert!(plan.candidates(0).is_empty());
        assert!(CrawlPlan::default().is_empty());
    }
}
