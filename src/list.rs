use anyhow::Result;
use cookbook_core::models::Category;

use crate::check::{entry_status, EntryStatus};
use crate::registry::Registry;

/// One line of `cookbook list` output.
#[derive(Debug, Clone)]
pub struct ListRow {
    pub slug: String,
    pub status: EntryStatus,
    pub requires_api_key: bool,
    pub tags: Vec<String>,
}

/// Rows for one category, in declared order. Notebook status uses the same
/// labels as `cookbook check`.
pub fn list_category(registry: &Registry, category: Category) -> Result<Vec<ListRow>> {
    let manifest = registry.manifest()?;
    Ok(manifest
        .entries(category)
        .iter()
        .map(|raw| ListRow {
            slug: raw.slug.clone(),
            status: entry_status(registry, raw),
            requires_api_key: raw.requires_api_key,
            tags: raw.tags.clone(),
        })
        .collect())
}

pub fn run_list(registry: &Registry, category: Option<Category>) -> Result<()> {
    let categories: Vec<Category> = match category {
        Some(c) => vec![c],
        None => Category::ALL.to_vec(),
    };

    for (i, category) in categories.into_iter().enumerate() {
        let rows = list_category(registry, category)?;
        if i > 0 {
            println!();
        }
        println!("{} ({})", category.label(), rows.len());
        if rows.is_empty() {
            continue;
        }

        println!("  {:<28} {:<12} {:<6} TAGS", "SLUG", "NOTEBOOK", "KEY");
        for row in &rows {
            let key = if row.requires_api_key { "yes" } else { "no" };
            println!(
                "  {:<28} {:<12} {:<6} {}",
                row.slug,
                row.status.label(),
                key,
                row.tags.join(", ")
            );
        }
    }

    Ok(())
}
