//! Slug derivation for enhanced articles.

use std::collections::HashSet;

/// Appended to every derived slug to mark the enhanced variant.
pub const SLUG_SUFFIX: &str = "-updated-v2";

/// Base used when the title has no usable characters.
pub const FALLBACK_SLUG_BASE: &str = "article";

/// Lowercase `title`, drop everything but `[a-z0-9]`, whitespace and `-`,
/// turn whitespace runs into single hyphens and trim hyphens at both ends.
pub fn normalize_title(title: &str) -> String {
    let kept: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();

    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .trim_matches('-')
        .to_string()
}

/// Derive a slug for `title` that is not already in `existing`.
///
/// The first candidate is `<normalized-title>-updated-v2`; on collision a
/// numeric suffix (`-2`, `-3`, ...) is appended until the slug is free.
pub fn derive_slug(title: &str, existing: &HashSet<String>) -> String {
    let mut base = normalize_title(title);
    if base.is_empty() {
        base = FALLBACK_SLUG_BASE.to_string();
    }

    let candidate = format!("{base}{SLUG_SUFFIX}");
    if !existing.contains(&candidate) {
        return candidate;
    }

    let mut n = 2u64;
    loop {
        let numbered = format!("{candidate}-{n}");
        if !existing.contains(&numbered) {
            return numbered;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_url_safe(slug: &str) -> bool {
        slug.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            && !slug.starts_with('-')
            && !slug.ends_with('-')
    }

    #[test]
    fn derives_slug_from_title() {
        let slug = derive_slug("AI In Healthcare: Hype or Reality?", &HashSet::new());
        assert_eq!(slug, "ai-in-healthcare-hype-or-reality-updated-v2");
        assert!(is_url_safe(&slug));
    }

    #[test]
    fn empty_title_uses_fallback() {
        assert_eq!(derive_slug("", &HashSet::new()), "article-updated-v2");
        assert_eq!(derive_slug("  ?!  ", &HashSet::new()), "article-updated-v2");
    }

    #[test]
    fn normalize_strips_and_trims() {
        assert_eq!(normalize_title("  -- Hello,   World! --  "), "hello-world");
        assert_eq!(normalize_title("Café\tMenu 2025"), "caf-menu-2025");
        assert_eq!(normalize_title("a - b"), "a---b");
    }

    #[test]
    fn collision_appends_counter() {
        let existing: HashSet<String> = ["ai-in-healthcare-updated-v2".to_string()].into();
        let slug = derive_slug("AI In Healthcare", &existing);
        assert_eq!(slug, "ai-in-healthcare-updated-v2-2");
        assert!(!existing.contains(&slug));
    }

    #[test]
    fn collision_skips_taken_counters() {
        let existing: HashSet<String> = [
            "ai-in-healthcare-updated-v2",
            "ai-in-healthcare-updated-v2-2",
            "ai-in-healthcare-updated-v2-3",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        assert_eq!(
            derive_slug("AI In Healthcare", &existing),
            "ai-in-healthcare-updated-v2-4"
        );
    }

    #[test]
    fn unrelated_slugs_do_not_matter() {
        let existing: HashSet<String> = ["ai-in-healthcare".to_string()].into();
        assert_eq!(
            derive_slug("AI In Healthcare", &existing),
            "ai-in-healthcare-updated-v2"
        );
    }
}
