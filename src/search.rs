//! Substring search over enriched entries.
//!
//! Matching is case-insensitive against slug, title, description and tags.
//! There is no ranking: hits come back in category order, then declared
//! order. Used by `cookbook search` and `GET /search`.

use anyhow::{bail, Result};
use cookbook_core::models::{Category, EnrichedEntry};
use serde::Serialize;

use crate::registry::Registry;

/// Maximum excerpt length printed by the CLI, in characters.
const EXCERPT_CHARS: usize = 160;

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub category: Category,
    #[serde(flatten)]
    pub entry: EnrichedEntry,
}

/// Core search function returning structured hits (used by CLI and server).
pub fn search_entries(
    registry: &Registry,
    query: &str,
    category: Option<Category>,
) -> Result<Vec<SearchHit>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        bail!("query must not be empty");
    }

    let categories: Vec<Category> = match category {
        Some(c) => vec![c],
        None => Category::ALL.to_vec(),
    };

    let mut hits = Vec::new();
    for category in categories {
        for entry in registry.load_category_entries(category)? {
            if matches(&entry, &needle) {
                hits.push(SearchHit { category, entry });
            }
        }
    }
    Ok(hits)
}

fn matches(entry: &EnrichedEntry, needle: &str) -> bool {
    entry.raw.slug.to_lowercase().contains(needle)
        || entry.raw.title.to_lowercase().contains(needle)
        || entry.description.to_lowercase().contains(needle)
        || entry
            .raw
            .tags
            .iter()
            .any(|t| t.to_lowercase().contains(needle))
}

/// CLI entry point. Calls search_entries and prints to stdout.
pub fn run_search(
    registry: &Registry,
    query: &str,
    category: Option<Category>,
    limit: Option<usize>,
) -> Result<()> {
    let mut hits = search_entries(registry, query, category)?;
    if let Some(limit) = limit {
        hits.truncate(limit);
    }

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        println!("{}. {} / {}", i + 1, hit.category, hit.entry.title());
        println!("    slug: {}", hit.entry.slug());
        if !hit.entry.raw.tags.is_empty() {
            println!("    tags: {}", hit.entry.raw.tags.join(", "));
        }
        if !hit.entry.source_url.is_empty() {
            println!("    url: {}", hit.entry.source_url);
        }
        if !hit.entry.description.is_empty() {
            println!("    excerpt: \"{}\"", excerpt(&hit.entry.description));
        }
        println!();
    }

    Ok(())
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(EXCERPT_CHARS).collect();
    format!("{}…", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::test_support::*;
    use tempfile::TempDir;

    fn slugs(hits: &[SearchHit]) -> Vec<&str> {
        hits.iter().map(|h| h.entry.slug()).collect()
    }

    #[test]
    fn matches_title_tags_and_description() {
        let tmp = TempDir::new().unwrap();
        seed_content(tmp.path());
        let (registry, _) = counting_registry(REGISTRY_YAML, tmp.path());

        let hits = search_entries(&registry, "QDRANT", None).unwrap();
        assert_eq!(slugs(&hits), ["csv-to-qdrant", "pdf-to-qdrant", "rag-agent"]);

        let hits = search_entries(&registry, "openai", None).unwrap();
        assert_eq!(slugs(&hits), ["rag-agent"]);
        assert_eq!(hits[0].category, Category::Agents);

        let hits = search_entries(&registry, "agent demo", None).unwrap();
        assert_eq!(slugs(&hits), ["rag-agent"]);
    }

    #[test]
    fn category_filter_limits_scope() {
        let tmp = TempDir::new().unwrap();
        seed_content(tmp.path());
        let (registry, _) = counting_registry(REGISTRY_YAML, tmp.path());
        let hits = search_entries(&registry, "qdrant", Some(Category::Configs)).unwrap();
        assert!(hits.is_empty());
        let hits = search_entries(&registry, "hnsw", Some(Category::Configs)).unwrap();
        assert_eq!(slugs(&hits), ["hnsw-tuning"]);
        let hits = search_entries(&registry, "hnsw", Some(Category::Etl)).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn empty_query_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let (registry, _) = counting_registry(REGISTRY_YAML, tmp.path());
        let err = search_entries(&registry, "   ", None).unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn no_match_is_empty() {
        let tmp = TempDir::new().unwrap();
        let (registry, _) = counting_registry(REGISTRY_YAML, tmp.path());
        assert!(search_entries(&registry, "zzz", None).unwrap().is_empty());
    }

    #[test]
    fn long_excerpt_is_truncated() {
        let long = "word ".repeat(100);
        let short = excerpt(&long);
        assert!(short.ends_with('…'));
        assert!(short.chars().count() <= EXCERPT_CHARS + 1);
        assert_eq!(excerpt("short"), "short");
    }
}
