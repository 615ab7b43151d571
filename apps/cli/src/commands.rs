//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use sitecontext_core::{
    CrawlProgress, PipelineConfig, ProgressReporter, SiteContext, build_site_context,
};
use sitecontext_shared::{
    AppConfig, CrawlSection, SkippedPage, init_config, load_config, load_config_from,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SiteContext: crawl a website into a bounded text context.
#[derive(Parser)]
#[command(
    name = "sitecontext",
    version,
    about = "Crawl a website's key pages into a bounded text context for LLM prompts.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.sitecontext/sitecontext.toml.
    #[arg(long = "config", global = true, env = "SITECONTEXT_CONFIG")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Output format for the crawl result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// The bare context block.
    Text,
    /// The full result: context, pages, skipped pages, timings.
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Crawl a site and print its context block.
    Crawl {
        /// Site URL (scheme-less input is treated as https).
        url: String,

        /// Output format.
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Write the output to a file instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        overrides: CrawlOverrides,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Per-run overrides of the `[crawl]` config section.
#[derive(clap::Args, Debug, Default)]
pub(crate) struct CrawlOverrides {
    /// Additional pages to fetch after the start page.
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Pause between secondary fetches, in milliseconds.
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Allow fetching loopback and private-network hosts.
    #[arg(long)]
    pub allow_private_hosts: bool,
}

impl CrawlOverrides {
    /// Apply CLI flags on top of the file config.
    fn apply(&self, crawl: &mut CrawlSection) {
        if let Some(max_pages) = self.max_pages {
            crawl.max_pages = max_pages;
        }
        if let Some(timeout) = self.timeout {
            crawl.timeout_secs = timeout;
        }
        if let Some(delay_ms) = self.delay_ms {
            crawl.delay_ms = delay_ms;
        }
        if self.allow_private_hosts {
            crawl.allow_private_hosts = true;
        }
    }
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "sitecontext=info",
        1 => "sitecontext=debug",
        _ => "sitecontext=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_file.as_deref();
    match cli.command {
        Command::Crawl {
            url,
            format,
            out,
            overrides,
        } => cmd_crawl(&url, format, out.as_deref(), &overrides, config_path).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path).await,
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

async fn cmd_crawl(
    url: &str,
    format: OutputFormat,
    out: Option<&Path>,
    overrides: &CrawlOverrides,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = resolve_config(config_path)?;
    overrides.apply(&mut config.crawl);
    let pipeline = PipelineConfig::from(&config);

    info!(url, max_pages = config.crawl.max_pages, "crawling site");

    let reporter = CliProgress::new();
    let result = build_site_context(url, &pipeline, &reporter).await;
    reporter.finish();
    let result = result.wrap_err_with(|| format!("could not build context for '{url}'"))?;

    let rendered = render(&result, format)?;
    match out {
        Some(path) => {
            std::fs::write(path, &rendered)
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "  Wrote {} pages ({} skipped) to {}",
                result.pages_crawled,
                result.skipped.len(),
                path.display()
            );
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

fn render(result: &SiteContext, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => result.context.clone(),
        OutputFormat::Json => serde_json::to_string_pretty(result)?,
    })
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl CrawlProgress for CliProgress {
    fn page_fetched(&self, url: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Fetched [{current}/{total}] {url}"));
    }

    fn page_skipped(&self, skipped: &SkippedPage) {
        self.spinner
            .println(format!("  skipped {} ({})", skipped.url, skipped.reason));
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, result: &SiteContext) {
        self.spinner.set_message(format!(
            "Crawled {} pages in {:.1}s",
            result.pages_crawled,
            result.duration_ms as f64 / 1000.0
        ));
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
