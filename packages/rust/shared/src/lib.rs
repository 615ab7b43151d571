//! Shared types, error model, and configuration for SiteContext.
//!
//! This crate is the foundation depended on by all other SiteContext crates.
//! It provides:
//! - [`SiteContextError`] - the unified error type
//! - Domain types ([`PageRecord`], [`SkippedPage`], [`ExtractLimits`], [`ContextLimits`])
//! - Configuration ([`AppConfig`], [`CrawlConfig`], config loading)

pub mod config;
pub mod error;
pub mod text;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CrawlConfig, CrawlSection, DEFAULT_PRIORITY_TOKENS, DEFAULT_USER_AGENT,
    config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{FetchErrorKind, Result, SiteContextError};
pub use text::{collapse_whitespace, truncate_chars};
pub use types::{ContextLimits, ExtractLimits, PageRecord, SkippedPage};
