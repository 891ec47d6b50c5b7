//! Main-content detection and plain-text excerpt extraction.
//!
//! Candidate regions are tried in a fixed priority order. The first region
//! whose trimmed text is longer than its threshold wins, so a short teaser
//! `<article>` does not shadow a long `<main>` further down the page. When
//! nothing qualifies the whole `<body>` is used.

use scraper::{ElementRef, Html, Selector};

use enhancer_shared::{EnhancerError, Result};

/// Minimum trimmed length a candidate region must exceed to be chosen.
pub const MIN_CANDIDATE_CHARS: usize = 500;

/// Hard cap on excerpt length, in characters.
pub const MAX_EXCERPT_CHARS: usize = 4000;

/// Content regions in priority order, each with its minimum length.
const CANDIDATE_REGIONS: [(&str, usize); 4] = [
    ("article", MIN_CANDIDATE_CHARS),
    ("main", MIN_CANDIDATE_CHARS),
    (r#"div[class*="content"]"#, MIN_CANDIDATE_CHARS),
    (r#"div[class*="post"]"#, MIN_CANDIDATE_CHARS),
];

/// Elements whose text never counts as page content.
const NON_CONTENT_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Where an excerpt was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRegion {
    /// One of the candidate selectors.
    Selector(&'static str),
    /// The `<body>` fallback.
    Body,
}

impl std::fmt::Display for ContentRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Selector(sel) => f.write_str(sel),
            Self::Body => f.write_str("body"),
        }
    }
}

/// Result of extracting an excerpt from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Excerpt {
    /// Whitespace-collapsed, length-bounded text. May be empty.
    pub text: String,
    pub region: ContentRegion,
}

/// Pre-compiled selectors for the main-content heuristic.
pub struct ContentExtractor {
    candidates: Vec<(&'static str, Selector, usize)>,
    body: Selector,
}

impl ContentExtractor {
    pub fn new() -> Result<Self> {
        let candidates = CANDIDATE_REGIONS
            .iter()
            .map(|&(css, min_chars)| -> Result<(&'static str, Selector, usize)> {
                Ok((css, compile(css)?, min_chars))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            candidates,
            body: compile("body")?,
        })
    }

    /// Extract the main-content excerpt from a full HTML document.
    pub fn extract(&self, html: &str) -> Excerpt {
        let doc = Html::parse_document(html);

        for &(css, ref selector, min_chars) in &self.candidates {
            let text = collect_text(doc.select(selector));
            if text.trim().chars().count() > min_chars {
                return Excerpt {
                    text: normalize(&text),
                    region: ContentRegion::Selector(css),
                };
            }
        }

        Excerpt {
            text: normalize(&collect_text(doc.select(&self.body))),
            region: ContentRegion::Body,
        }
    }
}

fn compile(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| EnhancerError::config(format!("invalid content selector '{css}': {e}")))
}

/// Concatenate the text of every matched element.
fn collect_text<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> String {
    elements.map(element_text).collect::<Vec<_>>().join(" ")
}

/// Text content of an element, skipping scripts and styles.
fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();

    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| NON_CONTENT_TAGS.contains(&el.name()))
        });
        if !hidden {
            out.push_str(text);
        }
    }

    out
}

/// Collapse whitespace runs, trim, and cap at [`MAX_EXCERPT_CHARS`].
pub fn normalize(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_EXCERPT_CHARS {
        return collapsed;
    }

    let truncated: String = collapsed.chars().take(MAX_EXCERPT_CHARS).collect();
    truncated.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/html/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    fn has_whitespace_run(text: &str) -> bool {
        text.chars()
            .zip(text.chars().skip(1))
            .any(|(a, b)| a.is_whitespace() && b.is_whitespace())
    }

    #[test]
    fn article_wins_when_long_enough() {
        let extractor = ContentExtractor::new().unwrap();
        let excerpt = extractor.extract(&load_fixture("blog-post.html"));

        assert_eq!(excerpt.region, ContentRegion::Selector("article"));
        assert!(excerpt.text.starts_with("AI In Healthcare: Hype Or Reality?"));
        assert!(excerpt.text.contains("Triage assistants"));
        // Chrome and scripts are not part of the article.
        assert!(!excerpt.text.contains("Pricing"));
        assert!(!excerpt.text.contains("inline widget"));
        assert!(!excerpt.text.contains("Related posts"));
        assert!(!has_whitespace_run(&excerpt.text));
    }

    #[test]
    fn short_article_does_not_shadow_main() {
        let extractor = ContentExtractor::new().unwrap();
        let excerpt = extractor.extract(&load_fixture("teaser-then-main.html"));

        assert_eq!(excerpt.region, ContentRegion::Selector("main"));
        assert!(excerpt.text.starts_with("Hype vs reality"));
        assert!(!excerpt.text.contains("Teaser"));
    }

    #[test]
    fn falls_back_to_body_when_nothing_qualifies() {
        let extractor = ContentExtractor::new().unwrap();
        let excerpt = extractor.extract(&load_fixture("nav-heavy.html"));

        assert_eq!(excerpt.region, ContentRegion::Body);
        assert_eq!(
            excerpt.text,
            "Home About Welcome to our short landing page. Sign up for updates. Contact us any time."
        );
    }

    #[test]
    fn content_class_is_third_choice() {
        let body = "word ".repeat(150);
        let html = format!(
            r#"<html><body><main><p>Short main.</p></main>
            <div class="entry-content"><p>{body}</p></div>
            <div class="post-body"><p>post text</p></div></body></html>"#
        );

        let extractor = ContentExtractor::new().unwrap();
        let excerpt = extractor.extract(&html);
        assert_eq!(
            excerpt.region,
            ContentRegion::Selector(r#"div[class*="content"]"#)
        );
        assert!(!excerpt.text.contains("post text"));
    }

    #[test]
    fn threshold_is_strictly_greater_than() {
        let exactly = "x".repeat(MIN_CANDIDATE_CHARS);
        let html = format!("<html><body><p>outside</p><article>{exactly}</article></body></html>");

        let extractor = ContentExtractor::new().unwrap();
        let excerpt = extractor.extract(&html);
        assert_eq!(excerpt.region, ContentRegion::Body);
        assert!(excerpt.text.starts_with("outside"));
    }

    #[test]
    fn excerpt_is_capped_and_collapsed() {
        let paragraph = "Lorem   ipsum\n\n\tdolor sit amet. ".repeat(400);
        let html = format!("<html><body><article><p>{paragraph}</p></article></body></html>");

        let extractor = ContentExtractor::new().unwrap();
        let excerpt = extractor.extract(&html);
        assert!(excerpt.text.chars().count() <= MAX_EXCERPT_CHARS);
        assert!(excerpt.text.chars().count() > MAX_EXCERPT_CHARS - 10);
        assert!(!has_whitespace_run(&excerpt.text));
        assert!(excerpt.text.starts_with("Lorem ipsum dolor"));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "é".repeat(MAX_EXCERPT_CHARS + 50);
        let normalized = normalize(&text);
        assert_eq!(normalized.chars().count(), MAX_EXCERPT_CHARS);
    }

    #[test]
    fn empty_document_yields_empty_excerpt() {
        let extractor = ContentExtractor::new().unwrap();
        let excerpt = extractor.extract("<html><body>  \n </body></html>");
        assert_eq!(excerpt.text, "");
        assert_eq!(excerpt.region, ContentRegion::Body);
    }
}
