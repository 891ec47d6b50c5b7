//! Reference page fetching and main-content extraction.
//!
//! This crate provides:
//! - [`PageScraper`]: fetches one URL and returns a bounded plain-text excerpt
//! - [`extract`]: the selector-priority main-content heuristic

pub mod extract;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};
use url::Url;

use enhancer_shared::{EnhancerError, Result, ScrapeConfig};

pub use extract::{
    ContentExtractor, ContentRegion, Excerpt, MAX_EXCERPT_CHARS, MIN_CANDIDATE_CHARS,
};

/// Maximum number of redirects to follow for a reference page.
const MAX_REDIRECTS: usize = 5;

/// Fetches reference pages and extracts their main content.
pub struct PageScraper {
    client: Client,
    extractor: ContentExtractor,
}

impl PageScraper {
    /// Create a scraper that identifies itself with `config.user_agent`.
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(config.timeout)
            .build()
            .map_err(|e| EnhancerError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            extractor: ContentExtractor::new()?,
        })
    }

    /// Fetch `url` and return its main-content excerpt.
    ///
    /// An empty excerpt is not an error; the caller decides what to do with it.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn scrape(&self, url: &Url) -> Result<String> {
        let response = self.client.get(url.as_str()).send().await.map_err(|e| {
            if e.is_timeout() {
                EnhancerError::scrape(url.as_str(), "request timed out")
            } else {
                EnhancerError::scrape(url.as_str(), e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnhancerError::scrape(url.as_str(), format!("HTTP {status}")));
        }

        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_markup(content_type) {
                return Err(EnhancerError::scrape(
                    url.as_str(),
                    format!("not an HTML document ({content_type})"),
                ));
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| EnhancerError::scrape(url.as_str(), format!("body read failed: {e}")))?;

        let excerpt = self.extractor.extract(&body);
        debug!(
            region = %excerpt.region,
            html_bytes = body.len(),
            chars = excerpt.text.chars().count(),
            "extracted excerpt"
        );

        Ok(excerpt.text)
    }
}

/// Whether a `Content-Type` can be parsed as markup.
fn is_markup(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("text/") || mime.contains("html") || mime.contains("xml")
}
