//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

use sitecache_cache::BatchReport;
use sitecache_content::{ContentClient, ContentService};
use sitecache_core::pipeline::{self, ProgressReporter};
use sitecache_core::{LookupField, SiteState};
use sitecache_shared::{AppConfig, ContentType, init_config, load_config, load_config_from};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// sitecache: fetch site content once, build the search index and routes.
#[derive(Parser)]
#[command(
    name = "sitecache",
    version,
    about = "Fetch content through a batch cache and build the site's search index and routes.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ~/.sitecache/sitecache.toml).
    #[arg(long, global = true, env = "SITECACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override `api.base_url` from the config file.
    #[arg(long, global = true, env = "SITECACHE_BASE_URL")]
    pub base_url: Option<Url>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch the search export and emit the search index as JSON.
    SearchIndex {
        /// Write to a file instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Fetch the route export and emit the route list as JSON.
    Routes {
        /// Write to a file instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Look up configured category metadata.
    Resolve {
        /// Content type key under `category_enums` (e.g. meetings).
        content_type: String,

        /// Value to match.
        value: String,

        /// Field to match against: enum or slug.
        #[arg(long, default_value = "enum")]
        by: LookupField,
    },

    /// Fetch list collections through the batch cache and print the report.
    Fetch {
        /// Collections to fetch: news, sections, meetings, publications, biographies.
        #[arg(required = true)]
        kinds: Vec<ContentType>,

        /// Submit the same batch a second time.
        #[arg(long)]
        repeat: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
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

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "sitecache=info",
        1 => "sitecache=debug",
        _ => "sitecache=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so JSON output on stdout stays pipeable.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
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
    if let Command::Config { action } = &cli.command {
        return match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(&resolve_config(&cli)?).await,
        };
    }

    let config = resolve_config(&cli)?;
    match cli.command {
        Command::SearchIndex { out } => cmd_search_index(config, out.as_deref()).await,
        Command::Routes { out } => cmd_routes(config, out.as_deref()).await,
        Command::Resolve {
            content_type,
            value,
            by,
        } => cmd_resolve(config, &content_type, &value, by).await,
        Command::Fetch { kinds, repeat } => cmd_fetch(config, &kinds, repeat).await,
        Command::Config { .. } => Ok(()),
    }
}

/// Config file (explicit or default location) with CLI overrides applied.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
        config.validate()?;
    }
    Ok(config)
}

/// Initialized state plus a service for its configured API.
async fn connect(config: AppConfig) -> Result<(SiteState, ContentService)> {
    let service = ContentService::new(ContentClient::new(&config.api)?);
    let state = SiteState::new(config);
    state.init().await;
    info!(endpoint = %service.client().endpoint(), "connected");
    Ok((state, service))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_search_index(config: AppConfig, out: Option<&Path>) -> Result<()> {
    let (state, service) = connect(config).await?;

    let reporter = CliProgress::new();
    let built = pipeline::build_search_index(&state, &service, &reporter).await?;

    let json = serde_json::to_string_pretty(built.output.as_slice())?;
    emit(&json, out)?;

    eprintln!(
        "  {} items in {:.1}s",
        built.output.len(),
        built.elapsed.as_secs_f64()
    );
    Ok(())
}

async fn cmd_routes(config: AppConfig, out: Option<&Path>) -> Result<()> {
    let (state, service) = connect(config).await?;

    let reporter = CliProgress::new();
    let built = pipeline::build_route_list(&state, &service, &reporter).await?;

    let json = serde_json::to_string_pretty(&built.output)?;
    emit(&json, out)?;

    eprintln!(
        "  {} routes in {:.1}s",
        built.output.len(),
        built.elapsed.as_secs_f64()
    );
    Ok(())
}

async fn cmd_resolve(
    config: AppConfig,
    content_type: &str,
    value: &str,
    by: LookupField,
) -> Result<()> {
    let state = SiteState::new(config);
    let matches = state.resolver().resolve(content_type, value, by);
    if matches.is_empty() {
        return Err(eyre!("no '{content_type}' category matches '{value}'"));
    }
    println!("{}", serde_json::to_string_pretty(&matches)?);
    Ok(())
}

async fn cmd_fetch(config: AppConfig, kinds: &[ContentType], repeat: bool) -> Result<()> {
    let (state, service) = connect(config).await?;
    let rounds = if repeat { 2 } else { 1 };

    let mut reports: Vec<BatchReport> = Vec::with_capacity(rounds);
    for _ in 0..rounds {
        let reporter = CliProgress::new();
        reports.push(pipeline::prefetch(&state, &service, kinds, &reporter).await?);
    }

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

/// Write `text` to `out`, or stdout when no file is given.
fn emit(text: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, text)
                .map_err(|e| eyre!("failed to write '{}': {e}", path.display()))?;
            info!(path = %path.display(), bytes = text.len(), "written");
        }
        None => println!("{text}"),
    }
    Ok(())
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
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn batch_done(&self, report: &BatchReport) {
        let message = if report.previously_cached {
            format!("Cache hit ({} entries)", report.total_cache_size)
        } else {
            format!(
                "Cached {} in {}ms",
                report.items_cached, report.milliseconds_to_complete
            )
        };
        self.spinner.set_message(message);
    }

    fn done(&self, _items: usize) {
        self.spinner.finish_and_clear();
    }
}
