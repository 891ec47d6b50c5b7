//! Enhanced-content synthesis.
//!
//! The synthesized body is the original article content followed by three
//! delimited sections: insights, analysis and references. The insight and
//! analysis text comes from an [`EnhancementProvider`] and is inserted
//! verbatim; the surrounding template never fails.

use tracing::{debug, instrument};

use enhancer_shared::{Article, EnhancerError, Reference, Result};

/// Heading that opens the insights section.
pub const INSIGHTS_MARKER: &str = "**Latest Insights:**";

/// Heading that opens the analysis section.
pub const ANALYSIS_MARKER: &str = "**Enhanced Analysis:**";

/// Heading that opens the references section.
pub const REFERENCES_MARKER: &str = "**References:**";

/// Longest lead sentence the baseline provider quotes from an excerpt.
const MAX_LEAD_CHARS: usize = 240;

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Text produced by an [`EnhancementProvider`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enhancement {
    /// Body of the insights section.
    pub insights: String,
    /// Body of the analysis section.
    pub analysis: String,
}

/// Generates the insights/analysis text for an article.
///
/// Implementations should be deterministic or document otherwise. Failures
/// are reported to callers as [`EnhancerError::Synthesis`].
pub trait EnhancementProvider: Send + Sync {
    /// Human-readable provider name for tracing.
    fn name(&self) -> &str;

    /// Produce enhancement text for `article` given the scraped `references`.
    fn generate(
        &self,
        article: &Article,
        references: &[Reference],
    ) -> impl Future<Output = Result<Enhancement>> + Send;
}

/// Deterministic provider that needs no external service.
///
/// Insights quote the lead sentence of each non-empty excerpt; when no
/// excerpt has text, a fixed set of topic-agnostic statements is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineProvider;

/// Used when no reference yielded any text.
const FALLBACK_INSIGHTS: [&str; 3] = [
    "Recent coverage adds practical context to the points raised in the original article.",
    "Independent sources describe both early results and the obstacles that remain.",
    "Adoption depends on cost, regulation and how well new approaches fit existing practice.",
];

impl EnhancementProvider for BaselineProvider {
    fn name(&self) -> &str {
        "baseline"
    }

    async fn generate(&self, article: &Article, references: &[Reference]) -> Result<Enhancement> {
        let mut lines: Vec<String> = references
            .iter()
            .filter_map(|r| lead_sentence(&r.excerpt))
            .map(|lead| format!("- {lead}"))
            .collect();

        if lines.is_empty() {
            lines = FALLBACK_INSIGHTS.iter().map(|s| format!("- {s}")).collect();
        }

        let sources = match references.len() {
            1 => "one reference source".to_string(),
            n => format!("{n} reference sources"),
        };
        let analysis = format!(
            "Drawing on {sources}, this update places \"{}\" alongside current reporting. \
             The sources agree on the overall direction while differing on timelines and \
             costs, so the points above are best read as a snapshot of the discussion \
             rather than a settled conclusion.",
            article.title
        );

        Ok(Enhancement {
            insights: lines.join("\n"),
            analysis,
        })
    }
}

/// First sentence of `excerpt`, capped at [`MAX_LEAD_CHARS`]. `None` if empty.
fn lead_sentence(excerpt: &str) -> Option<String> {
    let excerpt = excerpt.trim();
    if excerpt.is_empty() {
        return None;
    }

    let mut end = excerpt.len();
    let mut chars = excerpt.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?')
            && chars.peek().is_none_or(|&(_, next)| next.is_whitespace())
        {
            end = i + c.len_utf8();
            break;
        }
    }

    let sentence = &excerpt[..end];
    if sentence.chars().count() <= MAX_LEAD_CHARS {
        return Some(sentence.to_string());
    }

    let cut: String = sentence.chars().take(MAX_LEAD_CHARS).collect();
    Some(format!("{}...", cut.trim_end()))
}

// ---------------------------------------------------------------------------
// Synthesizer
// ---------------------------------------------------------------------------

/// Composes the enhanced article body.
#[derive(Debug, Clone, Default)]
pub struct ContentSynthesizer<P> {
    provider: P,
}

impl<P: EnhancementProvider> ContentSynthesizer<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Build the enhanced content for `article` from its scraped `references`.
    #[instrument(skip_all, fields(provider = self.provider.name(), references = references.len()))]
    pub async fn synthesize(&self, article: &Article, references: &[Reference]) -> Result<String> {
        let enhancement = self
            .provider
            .generate(article, references)
            .await
            .map_err(|e| match e {
                EnhancerError::Synthesis(_) => e,
                other => EnhancerError::Synthesis(format!("{}: {other}", self.provider.name())),
            })?;

        let content = compose(article, &enhancement, references);
        debug!(chars = content.chars().count(), "synthesized content");
        Ok(content)
    }
}

/// Assemble the final body from the article, provider output and references.
pub fn compose(article: &Article, enhancement: &Enhancement, references: &[Reference]) -> String {
    let reference_lines = references
        .iter()
        .map(|r| format!("- [{}]({})", r.title, r.url))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{content}\n\n{INSIGHTS_MARKER}\n{insights}\n\n{ANALYSIS_MARKER}\n{analysis}\n\n{REFERENCES_MARKER}\n{reference_lines}",
        content = article.content,
        insights = enhancement.insights,
        analysis = enhancement.analysis,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn article() -> Article {
        Article {
            id: 1,
            title: "AI In Healthcare".into(),
            slug: "ai-in-healthcare".into(),
            content: "Original body.\n\nSecond paragraph.".into(),
            source_url: None,
            is_updated: false,
        }
    }

    fn reference(title: &str, url: &str, excerpt: &str) -> Reference {
        Reference {
            title: title.into(),
            url: Url::parse(url).unwrap(),
            excerpt: excerpt.into(),
        }
    }

    struct FailingProvider;

    impl EnhancementProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn generate(&self, _: &Article, _: &[Reference]) -> Result<Enhancement> {
            Err(EnhancerError::Transport("model endpoint unreachable".into()))
        }
    }

    #[tokio::test]
    async fn output_sections_are_in_order() {
        let refs = vec![
            reference("First", "https://one.example.com/a", "Alpha is here. More text."),
            reference("Second", "https://two.example.com/b", "Beta follows!"),
        ];
        let synth = ContentSynthesizer::new(BaselineProvider);
        let out = synth.synthesize(&article(), &refs).await.unwrap();

        assert!(out.starts_with("Original body.\n\nSecond paragraph."));
        let insights = out.find(INSIGHTS_MARKER).unwrap();
        let analysis = out.find(ANALYSIS_MARKER).unwrap();
        let references = out.find(REFERENCES_MARKER).unwrap();
        assert!(insights < analysis && analysis < references);

        let section = &out[references..];
        assert_eq!(section.matches("[First](https://one.example.com/a)").count(), 1);
        assert_eq!(section.matches("[Second](https://two.example.com/b)").count(), 1);
        assert!(section.find("[First]").unwrap() < section.find("[Second]").unwrap());
    }

    #[tokio::test]
    async fn baseline_quotes_lead_sentences() {
        let refs = vec![
            reference("First", "https://one.example.com/a", "Alpha is here. More text."),
            reference("Empty", "https://two.example.com/b", ""),
        ];
        let enhancement = BaselineProvider.generate(&article(), &refs).await.unwrap();

        assert_eq!(enhancement.insights, "- Alpha is here.");
        assert!(enhancement.analysis.contains("2 reference sources"));
        assert!(enhancement.analysis.contains("\"AI In Healthcare\""));
    }

    #[tokio::test]
    async fn baseline_falls_back_to_fixed_statements() {
        let refs = vec![reference("Empty", "https://one.example.com/a", "")];
        let enhancement = BaselineProvider.generate(&article(), &refs).await.unwrap();

        assert_eq!(enhancement.insights.lines().count(), FALLBACK_INSIGHTS.len());
        assert!(enhancement.analysis.contains("one reference source"));
    }

    #[tokio::test]
    async fn baseline_is_deterministic() {
        let refs = vec![reference("First", "https://one.example.com/a", "Same input.")];
        let first = ContentSynthesizer::new(BaselineProvider)
            .synthesize(&article(), &refs)
            .await
            .unwrap();
        let second = ContentSynthesizer::new(BaselineProvider)
            .synthesize(&article(), &refs)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn provider_failure_is_synthesis_error() {
        let refs = vec![reference("First", "https://one.example.com/a", "x")];
        let err = ContentSynthesizer::new(FailingProvider)
            .synthesize(&article(), &refs)
            .await
            .unwrap_err();

        match err {
            EnhancerError::Synthesis(message) => {
                assert!(message.starts_with("failing:"));
                assert!(message.contains("unreachable"));
            }
            other => panic!("expected Synthesis error, got {other:?}"),
        }
    }

    #[test]
    fn compose_inserts_provider_text_verbatim() {
        let enhancement = Enhancement {
            insights: "  * custom insight  ".into(),
            analysis: "custom analysis".into(),
        };
        let refs = vec![reference("Only", "https://one.example.com/", "")];
        let out = compose(&article(), &enhancement, &refs);

        assert_eq!(
            out,
            "Original body.\n\nSecond paragraph.\n\n\
             **Latest Insights:**\n  * custom insight  \n\n\
             **Enhanced Analysis:**\ncustom analysis\n\n\
             **References:**\n- [Only](https://one.example.com/)"
        );
    }

    #[test]
    fn lead_sentence_ignores_decimal_points() {
        assert_eq!(
            lead_sentence("Accuracy rose by 2.5 points in trials. Then more.").as_deref(),
            Some("Accuracy rose by 2.5 points in trials.")
        );
        assert_eq!(lead_sentence("   ").as_deref(), None);
        assert_eq!(lead_sentence("No terminal punctuation").as_deref(), Some("No terminal punctuation"));
    }

    #[test]
    fn lead_sentence_is_capped() {
        let long = "word ".repeat(100);
        let lead = lead_sentence(&long).unwrap();
        assert!(lead.ends_with("..."));
        assert!(lead.chars().count() <= MAX_LEAD_CHARS + 3);
    }
}
