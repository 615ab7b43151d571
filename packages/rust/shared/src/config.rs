//! Application configuration for SiteContext.
//!
//! User config lives at `~/.sitecontext/sitecontext.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteContextError};
use crate::types::{ContextLimits, ExtractLimits};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "sitecontext.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".sitecontext";

/// Desktop browser identification sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Path-segment prefixes that mark a link as worth fetching first.
///
/// Covers about/services/product/pricing style pages, including the Danish
/// spellings (`om`, `ydelser`, `produkt`, `pris`).
pub const DEFAULT_PRIORITY_TOKENS: &[&str] = &[
    "about", "om", "services", "ydelser", "produkt", "product", "platform", "pricing", "pris",
    "why", "solution",
];

// ---------------------------------------------------------------------------
// Config structs (matching sitecontext.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Crawl budget and HTTP behaviour.
    #[serde(default)]
    pub crawl: CrawlSection,

    /// Extraction caps.
    #[serde(default)]
    pub extract: ExtractLimits,

    /// Context block caps.
    #[serde(default)]
    pub context: ContextLimits,
}

/// `[crawl]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSection {
    /// Additional pages fetched after the start page.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause between secondary fetches, in ms.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// `User-Agent` header value.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Path-segment prefixes that move a link to the front of the plan.
    #[serde(default = "default_priority_tokens")]
    pub priority_tokens: Vec<String>,

    /// Allow fetching loopback/private hosts.
    #[serde(default)]
    pub allow_private_hosts: bool,

    /// Maximum redirects followed per request.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for CrawlSection {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            timeout_secs: default_timeout_secs(),
            delay_ms: default_delay_ms(),
            user_agent: default_user_agent(),
            priority_tokens: default_priority_tokens(),
            allow_private_hosts: false,
            max_redirects: default_max_redirects(),
        }
    }
}

fn default_max_pages() -> usize {
    3
}
fn default_timeout_secs() -> u64 {
    12
}
fn default_delay_ms() -> u64 {
    300
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}
fn default_priority_tokens() -> Vec<String> {
    DEFAULT_PRIORITY_TOKENS.iter().map(|t| t.to_string()).collect()
}
fn default_max_redirects() -> usize {
    10
}

// ---------------------------------------------------------------------------
// Crawl config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime crawl configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Additional same-origin pages fetched after the start page.
    pub max_pages: usize,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Pause between secondary fetches.
    pub delay: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Relevance tokens for link prioritisation.
    pub priority_tokens: Vec<String>,
    /// Allow loopback/private hosts (integration tests, intranet use).
    pub allow_private_hosts: bool,
    /// Maximum redirects followed per request.
    pub max_redirects: usize,
    /// Caps applied to every extracted page.
    pub extract: ExtractLimits,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for CrawlConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_pages: config.crawl.max_pages,
            timeout: Duration::from_secs(config.crawl.timeout_secs),
            delay: Duration::from_millis(config.crawl.delay_ms),
            user_agent: config.crawl.user_agent.clone(),
            priority_tokens: config.crawl.priority_tokens.clone(),
            allow_private_hosts: config.crawl.allow_private_hosts,
            max_redirects: config.crawl.max_redirects,
            extract: config.extract,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.sitecontext/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SiteContextError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.sitecontext/sitecontext.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SiteContextError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        SiteContextError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SiteContextError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SiteContextError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SiteContextError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
