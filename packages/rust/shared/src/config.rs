//! Application configuration for the enhancer.
//!
//! User config lives at `~/.enhancer/enhancer.toml`.
//! CLI flags and environment variables override config file values,
//! which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{EnhancerError, Result};
use crate::types::ReferenceSource;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "enhancer.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".enhancer";

/// Browser identification sent with reference page requests.
/// Some sites reject requests that look automated.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// ---------------------------------------------------------------------------
// Config structs (matching enhancer.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Content API connection settings.
    #[serde(default)]
    pub content_api: ContentApiSettings,

    /// Reference page fetching.
    #[serde(default)]
    pub scraper: ScraperSettings,

    /// Run behavior.
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Reference pages consulted on every run, in order.
    #[serde(default = "default_references")]
    pub references: Vec<ReferenceSource>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            content_api: ContentApiSettings::default(),
            scraper: ScraperSettings::default(),
            pipeline: PipelineSettings::default(),
            references: default_references(),
        }
    }
}

/// `[content_api]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentApiSettings {
    /// Base URL of the content API (without the `/api/articles` path).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

impl Default for ContentApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_api_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".into()
}
fn default_api_timeout() -> u64 {
    30
}

/// `[scraper]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperSettings {
    /// User-Agent header for reference page requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_scrape_timeout")]
    pub timeout_secs: u64,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_scrape_timeout(),
        }
    }
}

fn default_user_agent() -> String {
    BROWSER_USER_AGENT.into()
}
fn default_scrape_timeout() -> u64 {
    20
}

/// What to do when a single reference page cannot be scraped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeFailurePolicy {
    /// Stop the run before anything is published.
    #[default]
    Abort,
    /// Drop the reference and continue with the ones that succeeded.
    Skip,
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineSettings {
    #[serde(default)]
    pub on_scrape_failure: ScrapeFailurePolicy,
}

fn default_references() -> Vec<ReferenceSource> {
    [
        (
            "AI In Healthcare: Hype Or Reality? - BeyondChats",
            "https://beyondchats.com/blogs/ai-in-healthcare-hype-or-reality/",
        ),
        (
            "Hype vs reality: AI technology in healthcare - Notable Health",
            "https://www.notablehealth.com/blog/ai-technology-in-healthcare",
        ),
    ]
    .into_iter()
    .filter_map(|(title, url)| Some(ReferenceSource::new(title, Url::parse(url).ok()?)))
    .collect()
}

// ---------------------------------------------------------------------------
// Runtime config (merged from config + environment + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime content API client settings.
#[derive(Debug, Clone)]
pub struct ContentApiConfig {
    /// Base URL; `api/articles` is resolved against it.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Runtime page scraper settings.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout: Duration::from_secs(default_scrape_timeout()),
        }
    }
}

impl From<&ScraperSettings> for ScrapeConfig {
    fn from(settings: &ScraperSettings) -> Self {
        Self {
            user_agent: settings.user_agent.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

/// Everything a single pipeline run needs, passed to the pipeline at construction.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub content_api: ContentApiConfig,
    pub scrape: ScrapeConfig,
    /// Ordered reference pages; order is preserved in the published article.
    pub references: Vec<ReferenceSource>,
    pub on_scrape_failure: ScrapeFailurePolicy,
    /// Run every stage except the final publish.
    pub dry_run: bool,
}

impl PipelineConfig {
    /// Build a config for `base_url` with default timeouts and the given references.
    pub fn new(base_url: Url, references: Vec<ReferenceSource>) -> Self {
        Self {
            content_api: ContentApiConfig {
                base_url,
                timeout: Duration::from_secs(default_api_timeout()),
            },
            scrape: ScrapeConfig::default(),
            references,
            on_scrape_failure: ScrapeFailurePolicy::default(),
            dry_run: false,
        }
    }

    /// Check the config before any network call is made.
    pub fn validate(&self) -> Result<()> {
        if !is_http(&self.content_api.base_url) {
            return Err(EnhancerError::config(format!(
                "content API base URL must be http(s): {}",
                self.content_api.base_url
            )));
        }

        if self.references.is_empty() {
            return Err(EnhancerError::config(
                "at least one reference page is required",
            ));
        }

        if let Some(bad) = self.references.iter().find(|r| !is_http(&r.url)) {
            return Err(EnhancerError::config(format!(
                "reference '{}' must be an http(s) URL: {}",
                bad.title, bad.url
            )));
        }

        if self.content_api.timeout.is_zero() || self.scrape.timeout.is_zero() {
            return Err(EnhancerError::config("timeouts must be greater than zero"));
        }

        Ok(())
    }
}

impl TryFrom<&AppConfig> for PipelineConfig {
    type Error = EnhancerError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        let base_url = Url::parse(&config.content_api.base_url).map_err(|e| {
            EnhancerError::config(format!(
                "invalid content API base URL '{}': {e}",
                config.content_api.base_url
            ))
        })?;

        Ok(Self {
            content_api: ContentApiConfig {
                base_url,
                timeout: Duration::from_secs(config.content_api.timeout_secs),
            },
            scrape: ScrapeConfig::from(&config.scraper),
            references: config.references.clone(),
            on_scrape_failure: config.pipeline.on_scrape_failure,
            dry_run: false,
        })
    }
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.enhancer/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| EnhancerError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.enhancer/enhancer.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| EnhancerError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        EnhancerError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| EnhancerError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| EnhancerError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| EnhancerError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
