//! Export the enriched registry as JSON for static site builds.
//!
//! Produces one document with every category already enriched, so the site
//! generator never has to parse notebooks itself.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use cookbook_core::models::EnrichedEntry;
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::registry::Registry;

#[derive(Debug, Serialize)]
pub struct ExportData {
    pub generated_at: String,
    pub etl: Vec<EnrichedEntry>,
    pub agents: Vec<EnrichedEntry>,
    pub configs: Vec<EnrichedEntry>,
}

impl ExportData {
    pub fn entry_count(&self) -> usize {
        self.etl.len() + self.agents.len() + self.configs.len()
    }
}

pub fn build_export(registry: &Registry) -> Result<ExportData> {
    Ok(ExportData {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        etl: registry.etl_recipes()?,
        agents: registry.agents()?,
        configs: registry.configs()?,
    })
}

/// Export all entries as JSON.
///
/// If `output` is `Some`, writes to that file path. Otherwise writes
/// to stdout for piping.
pub fn run_export(registry: &Registry, output: Option<&Path>) -> Result<()> {
    let data = build_export(registry)?;
    let json = serde_json::to_string_pretty(&data)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create export directory: {}", parent.display())
                })?;
            }
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write export: {}", path.display()))?;
            info!(entries = data.entry_count(), path = %path.display(), "export written");
            eprintln!(
                "Exported {} entries ({} etl, {} agents, {} configs) to {}",
                data.entry_count(),
                data.etl.len(),
                data.agents.len(),
                data.configs.len(),
                path.display()
            );
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}
