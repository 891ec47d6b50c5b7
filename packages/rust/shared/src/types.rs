//! Domain types shared by the content API client and the pipeline.

use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

// ---------------------------------------------------------------------------
// Article
// ---------------------------------------------------------------------------

/// An article record as returned by the content API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Server-assigned identifier, unique across articles.
    pub id: u64,
    /// Display title.
    pub title: String,
    /// URL-safe unique identifier.
    pub slug: String,
    /// Body text.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    /// Attributed origin of the content.
    #[serde(default)]
    pub source_url: Option<String>,
    /// Whether this article is an enhanced variant of an earlier one.
    #[serde(default, deserialize_with = "flag")]
    pub is_updated: bool,
}

/// Payload for `POST /api/articles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewArticle {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub source_url: String,
    pub is_updated: bool,
}

/// Accepts `null` wherever a string body is expected.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `true`/`false`, `0`/`1` and `null` for boolean columns.
fn flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(n)) => n != 0,
        None => false,
    })
}

// ---------------------------------------------------------------------------
// References
// ---------------------------------------------------------------------------

/// A supplementary source to consult, before it has been scraped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSource {
    /// Human-readable label.
    pub title: String,
    /// Page to scrape.
    pub url: Url,
}

impl ReferenceSource {
    pub fn new(title: impl Into<String>, url: Url) -> Self {
        Self {
            title: title.into(),
            url,
        }
    }
}

/// A reference page together with the excerpt scraped from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub title: String,
    pub url: Url,
    /// Extracted plain text; may be empty when the page had no text.
    pub excerpt: String,
}

impl Reference {
    /// Attach a scraped excerpt to its source.
    pub fn scraped(source: &ReferenceSource, excerpt: String) -> Self {
        Self {
            title: source.title.clone(),
            url: source.url.clone(),
            excerpt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_from_content_api_json() {
        let json = r#"[
            {"id": 1, "title": "AI In Healthcare", "slug": "ai-in-healthcare",
             "content": "Body", "source_url": "https://example.com/a",
             "created_at": "2025-01-01T00:00:00.000000Z"},
            {"id": 2, "title": "Second", "slug": "second", "content": null,
             "source_url": null, "is_updated": 1}
        ]"#;

        let articles: Vec<Article> = serde_json::from_str(json).expect("deserialize");
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].source_url.as_deref(), Some("https://example.com/a"));
        assert!(!articles[0].is_updated);
        assert_eq!(articles[1].content, "");
        assert!(articles[1].is_updated);
    }

    #[test]
    fn new_article_uses_snake_case_fields() {
        let payload = NewArticle {
            title: "T (AI Enhanced)".into(),
            slug: "t-updated-v2".into(),
            content: "C".into(),
            source_url: "https://example.com/ref".into(),
            is_updated: true,
        };

        let value = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(value["source_url"], "https://example.com/ref");
        assert_eq!(value["is_updated"], true);
    }

    #[test]
    fn reference_keeps_source_title_and_url() {
        let source = ReferenceSource::new(
            "Notable Health",
            Url::parse("https://www.notablehealth.com/blog/ai").unwrap(),
        );
        let reference = Reference::scraped(&source, "excerpt".into());
        assert_eq!(reference.title, "Notable Health");
        assert_eq!(reference.url, source.url);
        assert_eq!(reference.excerpt, "excerpt");
    }
}
