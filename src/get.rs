//! Entry retrieval by category and slug.
//!
//! Used by both the `cookbook get` CLI command and the
//! `GET /entries/{category}/{slug}` HTTP endpoint.

use anyhow::Result;
use cookbook_core::models::{Category, EnrichedEntry};
use thiserror::Error;

use crate::registry::Registry;

/// No entry with this slug in the category.
#[derive(Debug, Error)]
#[error("entry not found: {category}/{slug}")]
pub struct EntryNotFound {
    pub category: Category,
    pub slug: String,
}

/// Core get function returning structured data (used by CLI and server).
///
/// When a slug is declared more than once, the first declaration wins.
pub fn get_entry(registry: &Registry, category: Category, slug: &str) -> Result<EnrichedEntry> {
    registry
        .find_entry(category, slug)?
        .ok_or_else(|| {
            EntryNotFound {
                category,
                slug: slug.to_string(),
            }
            .into()
        })
}

/// CLI entry point. Calls get_entry and prints to stdout.
pub fn run_get(registry: &Registry, category: Category, slug: &str, json: bool) -> Result<()> {
    let entry = get_entry(registry, category, slug)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    println!("--- Entry ---");
    println!("category:         {}", category);
    println!("slug:             {}", entry.raw.slug);
    println!("title:            {}", entry.raw.title);
    println!("tags:             {}", entry.raw.tags.join(", "));
    println!("requires_api_key: {}", entry.raw.requires_api_key);
    if entry.raw.has_notebook() {
        println!("notebook:         {}", entry.raw.notebook);
        println!("colab:            {}", entry.viewer_url);
        println!("github:           {}", entry.source_url);
    }
    println!();

    println!("--- Description ---");
    if entry.description.is_empty() {
        println!("(none)");
    } else {
        println!("{}", entry.description);
    }
    println!();

    println!("--- Code ({}) ---", entry.language);
    if entry.code.is_empty() {
        println!("(none)");
    } else {
        println!("{}", entry.code);
    }

    Ok(())
}
