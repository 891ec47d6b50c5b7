//! End-to-end enhancement run: fetch latest → scrape references → synthesize → publish.
//!
//! A run is strictly sequential. Each stage either completes or returns the
//! first error it hits; nothing is retried and nothing is rolled back, since
//! the only write to the content API is the final publish.

use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{error, info, instrument, warn};
use url::Url;

use enhancer_content_api::ContentApiClient;
use enhancer_scraper::PageScraper;
use enhancer_shared::{
    Article, EnhancerError, NewArticle, PipelineConfig, Reference, Result, ScrapeFailurePolicy,
};

use crate::slug;
use crate::synthesis::{ContentSynthesizer, EnhancementProvider};

/// Appended to the original title of every enhanced article.
///
/// Readers of the content API detect enhanced articles by this exact substring.
pub const ENHANCED_TITLE_SUFFIX: &str = " (AI Enhanced)";

// ---------------------------------------------------------------------------
// Stages, outcomes, progress
// ---------------------------------------------------------------------------

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchLatest,
    ScrapeReferences,
    Synthesize,
    Publish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FetchLatest => "fetch_latest",
            Self::ScrapeReferences => "scrape_references",
            Self::Synthesize => "synthesize",
            Self::Publish => "publish",
        })
    }
}

/// A successfully published enhanced article.
#[derive(Debug, Clone)]
pub struct Published {
    /// The article as created by the content API.
    pub article: Article,
    /// Id of the article that was enhanced.
    pub source_id: u64,
    /// Number of references included in the content.
    pub references_used: usize,
    pub published_at: DateTime<Utc>,
    pub elapsed: Duration,
}

/// Terminal state of a successful run.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The content API had no articles.
    NothingToEnhance,
    /// Every stage ran except the publish; `payload` is what would have been sent.
    DryRun { source_id: u64, payload: NewArticle },
    Published(Published),
}

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a stage.
    fn stage(&self, stage: Stage);
    /// Called after each reference page is scraped.
    fn reference_scraped(&self, url: &Url, chars: usize, current: usize, total: usize);
    /// Called when the run completes successfully.
    fn done(&self, outcome: &RunOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage(&self, _stage: Stage) {}
    fn reference_scraped(&self, _url: &Url, _chars: usize, _current: usize, _total: usize) {}
    fn done(&self, _outcome: &RunOutcome) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// The enhancement pipeline, built once from an explicit config.
pub struct Pipeline<P> {
    config: PipelineConfig,
    api: ContentApiClient,
    scraper: PageScraper,
    synthesizer: ContentSynthesizer<P>,
}

impl<P: EnhancementProvider> Pipeline<P> {
    /// Validate `config` and build the clients a run needs.
    pub fn new(config: PipelineConfig, provider: P) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            api: ContentApiClient::new(&config.content_api)?,
            scraper: PageScraper::new(&config.scrape)?,
            synthesizer: ContentSynthesizer::new(provider),
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage once.
    ///
    /// Errors are logged with the stage they occurred in and returned as-is.
    #[instrument(skip_all, fields(api = %self.config.content_api.base_url, dry_run = self.config.dry_run))]
    pub async fn run(&self, progress: &dyn ProgressReporter) -> Result<RunOutcome> {
        let start = Instant::now();
        info!(references = self.config.references.len(), "starting enhancement run");

        // --- Fetch latest ---
        progress.stage(Stage::FetchLatest);
        let articles = self
            .api
            .list_articles()
            .await
            .inspect_err(|e| log_failure(Stage::FetchLatest, e))?;

        let Some(latest) = select_latest(&articles) else {
            info!("content API has no articles, nothing to enhance");
            let outcome = RunOutcome::NothingToEnhance;
            progress.done(&outcome);
            return Ok(outcome);
        };
        info!(article_id = latest.id, title = %latest.title, "latest article selected");

        // --- Scrape references ---
        progress.stage(Stage::ScrapeReferences);
        let references = self
            .scrape_references(progress)
            .await
            .inspect_err(|e| log_failure(Stage::ScrapeReferences, e))?;

        // --- Synthesize ---
        progress.stage(Stage::Synthesize);
        let content = self
            .synthesizer
            .synthesize(latest, &references)
            .await
            .inspect_err(|e| log_failure(Stage::Synthesize, e))?;

        // --- Publish ---
        progress.stage(Stage::Publish);
        let existing: HashSet<String> = articles.iter().map(|a| a.slug.clone()).collect();
        let payload = build_payload(latest, content, &references, &existing);

        if self.config.dry_run {
            info!(slug = %payload.slug, "dry run, skipping publish");
            let outcome = RunOutcome::DryRun {
                source_id: latest.id,
                payload,
            };
            progress.done(&outcome);
            return Ok(outcome);
        }

        let article = self
            .api
            .create_article(&payload)
            .await
            .inspect_err(|e| log_failure(Stage::Publish, e))?;

        let published = Published {
            source_id: latest.id,
            references_used: references.len(),
            published_at: Utc::now(),
            elapsed: start.elapsed(),
            article,
        };

        info!(
            article_id = published.article.id,
            slug = %published.article.slug,
            source_id = published.source_id,
            references = published.references_used,
            elapsed_ms = published.elapsed.as_millis(),
            "enhanced article published"
        );

        let outcome = RunOutcome::Published(published);
        progress.done(&outcome);
        Ok(outcome)
    }

    /// Scrape every configured reference in order, one at a time.
    async fn scrape_references(&self, progress: &dyn ProgressReporter) -> Result<Vec<Reference>> {
        let sources = &self.config.references;
        let total = sources.len();

        for (i, source) in sources.iter().enumerate() {
            info!(index = i + 1, title = %source.title, url = %source.url, "using reference");
        }

        let mut references = Vec::with_capacity(total);
        let mut last_error = None;

        for (i, source) in sources.iter().enumerate() {
            match self.scraper.scrape(&source.url).await {
                Ok(excerpt) => {
                    let chars = excerpt.chars().count();
                    if excerpt.is_empty() {
                        warn!(url = %source.url, "reference page produced no text");
                    }
                    info!(url = %source.url, chars, "scraped reference");
                    progress.reference_scraped(&source.url, chars, i + 1, total);
                    references.push(Reference::scraped(source, excerpt));
                }
                Err(e) => match self.config.on_scrape_failure {
                    ScrapeFailurePolicy::Abort => return Err(e),
                    ScrapeFailurePolicy::Skip => {
                        warn!(url = %source.url, error = %e, "skipping reference");
                        last_error = Some(e);
                    }
                },
            }
        }

        match last_error {
            Some(e) if references.is_empty() => Err(e),
            _ => Ok(references),
        }
    }
}

fn log_failure(stage: Stage, e: &EnhancerError) {
    error!(%stage, error = %e, "enhancement run failed");
}

/// The article with the highest `id`, if any.
pub fn select_latest(articles: &[Article]) -> Option<&Article> {
    articles.iter().max_by_key(|a| a.id)
}

/// Assemble the publish payload for an enhanced version of `source`.
///
/// `references` must not be empty; the first one becomes the source URL.
pub fn build_payload(
    source: &Article,
    content: String,
    references: &[Reference],
    existing_slugs: &HashSet<String>,
) -> NewArticle {
    NewArticle {
        title: format!("{}{ENHANCED_TITLE_SUFFIX}", source.title),
        slug: slug::derive_slug(&source.title, existing_slugs),
        content,
        source_url: references
            .first()
            .map(|r| r.url.to_string())
            .unwrap_or_default(),
        is_updated: true,
    }
}
