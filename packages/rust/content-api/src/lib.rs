//! Typed client for the content API's article endpoints.
//!
//! The client is a thin boundary: one request per call, no retries, and
//! every failure mapped onto [`EnhancerError`] so the pipeline can decide
//! what to do with it.

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use url::Url;

use enhancer_shared::{Article, ContentApiConfig, EnhancerError, NewArticle, Result};

/// User-Agent string for content API requests.
const USER_AGENT: &str = concat!("enhancer/", env!("CARGO_PKG_VERSION"));

/// Path of the article collection, relative to the base URL.
const ARTICLES_PATH: &str = "api/articles";

/// Maximum number of response body characters carried into an error.
const MAX_ERROR_BODY: usize = 2000;

/// HTTP client for `GET`/`POST /api/articles`.
#[derive(Debug, Clone)]
pub struct ContentApiClient {
    client: Client,
    articles_url: Url,
}

impl ContentApiClient {
    /// Create a client for the API at `config.base_url`.
    pub fn new(config: &ContentApiConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| EnhancerError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            articles_url: articles_url(&config.base_url)?,
        })
    }

    /// The resolved `/api/articles` endpoint.
    pub fn articles_url(&self) -> &Url {
        &self.articles_url
    }

    /// Fetch every article known to the content API.
    #[instrument(skip_all, fields(url = %self.articles_url))]
    pub async fn list_articles(&self) -> Result<Vec<Article>> {
        let response = self
            .client
            .get(self.articles_url.clone())
            .send()
            .await
            .map_err(|e| transport_error(&self.articles_url, e))?;

        let response = ensure_success(response, false).await?;
        let articles: Vec<Article> = decode(response).await?;

        debug!(count = articles.len(), "listed articles");
        Ok(articles)
    }

    /// Create a new article and return it with its server-assigned `id`.
    #[instrument(skip_all, fields(url = %self.articles_url, slug = %payload.slug))]
    pub async fn create_article(&self, payload: &NewArticle) -> Result<Article> {
        let response = self
            .client
            .post(self.articles_url.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| transport_error(&self.articles_url, e))?;

        let response = ensure_success(response, true).await?;
        let article: Article = decode(response).await?;

        info!(id = article.id, slug = %article.slug, "article created");
        Ok(article)
    }
}

/// Resolve `api/articles` against the base URL, keeping any base path.
fn articles_url(base: &Url) -> Result<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(ARTICLES_PATH).map_err(|e| {
        EnhancerError::config(format!("cannot build articles URL from {base}: {e}"))
    })
}

fn transport_error(url: &Url, e: reqwest::Error) -> EnhancerError {
    if e.is_timeout() {
        EnhancerError::Transport(format!("{url}: request timed out"))
    } else {
        EnhancerError::Transport(format!("{url}: {e}"))
    }
}

/// Turn a non-2xx response into an error carrying the response body.
///
/// On writes, 409 and 422 mean the server rejected the payload itself.
async fn ensure_success(response: Response, is_write: bool) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let body: String = body.chars().take(MAX_ERROR_BODY).collect();

    if is_write && matches!(status, StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY) {
        return Err(EnhancerError::validation(status.as_u16(), body));
    }

    Err(EnhancerError::Api {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status().as_u16();
    let url = response.url().clone();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| transport_error(&url, e))?;

    serde_json::from_slice(&bytes).map_err(|e| EnhancerError::Api {
        status,
        body: format!("unexpected response shape: {e}"),
    })
}
