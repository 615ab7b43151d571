//! HTTP fetcher: one GET per URL, bounded by a timeout, no retries.

use std::net::IpAddr;

use reqwest::Client;
use reqwest::redirect::{Attempt, Policy};
use tracing::{debug, instrument};
use url::{Host, Url};

use sitecontext_shared::{CrawlConfig, FetchErrorKind, Result, SiteContextError};

/// Raw markup returned by a successful fetch.
#[derive(Debug, Clone)]
pub struct FetchedMarkup {
    /// The URL the body was served from, after redirects.
    pub url: Url,
    /// HTTP status code (always 2xx).
    pub status: u16,
    /// Response body decoded as text.
    pub markup: String,
}

/// Request-scoped HTTP client carrying the crawl's identification and limits.
pub struct Fetcher {
    client: Client,
    allow_private_hosts: bool,
}

impl Fetcher {
    /// Build a fetcher from the crawl configuration.
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let allow_private_hosts = config.allow_private_hosts;
        let max_redirects = config.max_redirects;

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(Policy::custom(move |attempt| {
                redirect_decision(attempt, max_redirects, allow_private_hosts)
            }))
            .timeout(config.timeout)
            .build()
            .map_err(|e| SiteContextError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            allow_private_hosts,
        })
    }

    /// GET `url` and return its body.
    ///
    /// Fails with [`SiteContextError::Fetch`] on transport failure, timeout,
    /// non-2xx status, or a blocked private host.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &Url) -> Result<FetchedMarkup> {
        if !self.allow_private_hosts && is_private_target(url) {
            return Err(SiteContextError::fetch(url.as_str(), FetchErrorKind::Blocked));
        }

        debug!("fetching page");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| SiteContextError::fetch(url.as_str(), transport_kind(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SiteContextError::fetch(
                url.as_str(),
                FetchErrorKind::Status(status.as_u16()),
            ));
        }

        let final_url = response.url().clone();
        let markup = response.text().await.map_err(|e| {
            let kind = if e.is_timeout() {
                FetchErrorKind::Timeout
            } else {
                FetchErrorKind::Body(e.to_string())
            };
            SiteContextError::fetch(url.as_str(), kind)
        })?;

        debug!(
            status = status.as_u16(),
            final_url = %final_url,
            bytes = markup.len(),
            "page fetched"
        );

        Ok(FetchedMarkup {
            url: final_url,
            status: status.as_u16(),
            markup,
        })
    }
}

fn transport_kind(err: &reqwest::Error) -> FetchErrorKind {
    if err.is_timeout() {
        FetchErrorKind::Timeout
    } else {
        FetchErrorKind::Transport(err.to_string())
    }
}

fn redirect_decision(
    attempt: Attempt<'_>,
    max_redirects: usize,
    allow_private: bool,
) -> reqwest::redirect::Action {
    if attempt.previous().len() > max_redirects {
        attempt.error("too many redirects")
    } else if !allow_private && is_private_target(attempt.url()) {
        attempt.error("redirect to a private or local host")
    } else {
        attempt.follow()
    }
}

// ---------------------------------------------------------------------------
// Private-host guard
// ---------------------------------------------------------------------------

/// Whether `url` targets something other than a public HTTP(S) host.
pub(crate) fn is_private_target(url: &Url) -> bool {
    match url.scheme() {
        "http" | "https" => {}
        _ => return true,
    }

    match url.host() {
        Some(Host::Ipv4(v4)) => is_private_ip(&IpAddr::V4(v4)),
        Some(Host::Ipv6(v6)) => is_private_ip(&IpAddr::V6(v6)),
        Some(Host::Domain(domain)) => {
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            domain == "localhost"
                || domain.ends_with(".localhost")
                || domain.ends_with(".local")
                || domain.ends_with(".internal")
        }
        None => true,
    }
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, c, _] = v4.octets();
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                // 100.64.0.0/10 (carrier-grade NAT)
                || (a == 100 && (b & 0xC0) == 64)
                || (a == 192 && b == 0 && c == 0)
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                // fc00::/7 unique local, fe80::/10 link local
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                || (v6.segments()[0] & 0xffc0) == 0xfe80
                || v6.to_ipv4_mapped().is_some_and(|v4| is_private_ip(&IpAddr::V4(v4)))
        }
    }
}
