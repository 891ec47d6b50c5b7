//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use enhancer_content_api::ContentApiClient;
use enhancer_core::pipeline::{
    Pipeline, ProgressReporter, RunOutcome, Stage, select_latest,
};
use enhancer_core::synthesis::BaselineProvider;
use enhancer_scraper::PageScraper;
use enhancer_shared::{
    AppConfig, PipelineConfig, ReferenceSource, ScrapeConfig, ScrapeFailurePolicy, init_config,
    load_config, load_config_from,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Enhancer: publish enhanced versions of the latest article.
#[derive(Parser)]
#[command(
    name = "enhancer",
    version,
    about = "Enrich the latest article from a content API with reference pages and publish the result.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.enhancer/enhancer.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

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
    /// Enhance the latest article and publish it.
    Run {
        /// Content API base URL.
        #[arg(long, env = "CONTENT_API_BASE")]
        api_base: Option<String>,

        /// Reference page as "Title|URL" (repeatable). Replaces the configured list.
        #[arg(short, long = "reference")]
        references: Vec<String>,

        /// Run every stage but print the payload instead of publishing it.
        #[arg(long)]
        dry_run: bool,

        /// Continue with the remaining references when one cannot be scraped.
        #[arg(long)]
        skip_failed_references: bool,
    },

    /// Show the article a run would enhance.
    Latest {
        /// Content API base URL.
        #[arg(long, env = "CONTENT_API_BASE")]
        api_base: Option<String>,
    },

    /// Scrape a single page and print its excerpt.
    Scrape {
        /// Page URL.
        url: String,
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
        0 => "enhancer=info",
        1 => "enhancer=debug",
        _ => "enhancer=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

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
    let config_path = cli.config;
    match cli.command {
        Command::Run {
            api_base,
            references,
            dry_run,
            skip_failed_references,
        } => {
            cmd_run(
                config_path,
                api_base.as_deref(),
                &references,
                dry_run,
                skip_failed_references,
            )
            .await
        }
        Command::Latest { api_base } => cmd_latest(config_path, api_base.as_deref()).await,
        Command::Scrape { url } => cmd_scrape(config_path, &url).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path).await,
        },
    }
}

/// Load the config file, preferring an explicit `--config` path.
fn app_config(path: Option<PathBuf>) -> Result<AppConfig> {
    Ok(match path {
        Some(path) => load_config_from(&path)?,
        None => load_config()?,
    })
}

/// Merge the config file with command-line overrides.
fn pipeline_config(
    config_path: Option<PathBuf>,
    api_base: Option<&str>,
    references: &[String],
) -> Result<PipelineConfig> {
    let mut app = app_config(config_path)?;
    if let Some(base) = api_base {
        app.content_api.base_url = base.to_string();
    }
    if !references.is_empty() {
        app.references = references
            .iter()
            .map(|r| parse_reference(r))
            .collect::<Result<Vec<_>>>()?;
    }

    Ok(PipelineConfig::try_from(&app)?)
}

/// Parse `"Title|URL"`; a bare URL is titled with its host.
fn parse_reference(raw: &str) -> Result<ReferenceSource> {
    let (title, url) = match raw.split_once('|') {
        Some((title, url)) => (Some(title.trim()), url.trim()),
        None => (None, raw.trim()),
    };

    let url = Url::parse(url).map_err(|e| eyre!("invalid reference URL '{url}': {e}"))?;
    let title = match title {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => url.host_str().unwrap_or(url.as_str()).to_string(),
    };

    Ok(ReferenceSource::new(title, url))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(
    config_path: Option<PathBuf>,
    api_base: Option<&str>,
    references: &[String],
    dry_run: bool,
    skip_failed_references: bool,
) -> Result<()> {
    let mut config = pipeline_config(config_path, api_base, references)?;
    config.dry_run = dry_run;
    if skip_failed_references {
        config.on_scrape_failure = ScrapeFailurePolicy::Skip;
    }

    info!(
        api = %config.content_api.base_url,
        references = config.references.len(),
        dry_run,
        "starting run"
    );

    let pipeline = Pipeline::new(config, BaselineProvider)?;
    let reporter = CliProgress::new();

    let outcome = match pipeline.run(&reporter).await {
        Ok(outcome) => outcome,
        Err(e) => {
            reporter.fail();
            return Err(e.into());
        }
    };

    println!();
    match outcome {
        RunOutcome::NothingToEnhance => {
            println!("  No articles found, nothing to enhance.");
        }
        RunOutcome::DryRun { source_id, payload } => {
            println!("  Dry run for article {source_id}, nothing was published.");
            println!();
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        RunOutcome::Published(published) => {
            println!("  Enhanced article published!");
            println!("  ID:         {}", published.article.id);
            println!("  Slug:       {}", published.article.slug);
            println!("  Title:      {}", published.article.title);
            println!("  Source:     article {}", published.source_id);
            println!("  References: {}", published.references_used);
            println!("  Published:  {}", published.published_at.to_rfc3339());
            println!("  Time:       {:.1}s", published.elapsed.as_secs_f64());
        }
    }
    println!();

    Ok(())
}

async fn cmd_latest(config_path: Option<PathBuf>, api_base: Option<&str>) -> Result<()> {
    let config = pipeline_config(config_path, api_base, &[])?;
    let client = ContentApiClient::new(&config.content_api)?;

    let articles = client.list_articles().await?;
    match select_latest(&articles) {
        Some(article) => {
            println!("  ID:      {}", article.id);
            println!("  Title:   {}", article.title);
            println!("  Slug:    {}", article.slug);
            println!("  Updated: {}", article.is_updated);
            println!("  Length:  {} chars", article.content.chars().count());
        }
        None => println!("  No articles found."),
    }

    Ok(())
}

async fn cmd_scrape(config_path: Option<PathBuf>, url: &str) -> Result<()> {
    let app = app_config(config_path)?;
    let url = Url::parse(url).map_err(|e| eyre!("invalid URL '{url}': {e}"))?;

    let scraper = PageScraper::new(&ScrapeConfig::from(&app.scraper))?;
    let excerpt = scraper.scrape(&url).await?;

    info!(%url, chars = excerpt.chars().count(), "scraped page");
    println!("{excerpt}");
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config_path: Option<PathBuf>) -> Result<()> {
    let config = app_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
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
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn fail(&self) {
        self.spinner.abandon_with_message("Run failed");
    }
}

impl ProgressReporter for CliProgress {
    fn stage(&self, stage: Stage) {
        let message = match stage {
            Stage::FetchLatest => "Fetching latest article",
            Stage::ScrapeReferences => "Scraping references",
            Stage::Synthesize => "Synthesizing enhanced content",
            Stage::Publish => "Publishing",
        };
        self.spinner.set_message(message);
    }

    fn reference_scraped(&self, url: &Url, chars: usize, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Scraped [{current}/{total}] {url} ({chars} chars)"));
    }

    fn done(&self, _outcome: &RunOutcome) {
        self.spinner.finish_and_clear();
    }
}
