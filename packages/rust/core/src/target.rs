//! Target URL normalization for user-supplied input.

use url::Url;

use sitecontext_shared::{Result, SiteContextError};

/// Turn user input into an absolute HTTP(S) URL.
///
/// Input without an `http://` or `https://` scheme is assumed to be `https`.
pub fn normalize_target(input: &str) -> Result<Url> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SiteContextError::validation("URL is empty"));
    }

    let lower = input.to_ascii_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://{input}")
    };

    let url = Url::parse(&candidate)
        .map_err(|e| SiteContextError::validation(format!("invalid URL '{input}': {e}")))?;

    if url.host_str().is_none_or(str::is_empty) {
        return Err(SiteContextError::validation(format!("URL has no host: {input}")));
    }

    Ok(url)
}
