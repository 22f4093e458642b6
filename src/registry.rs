//! Content registry loader.
//!
//! Turns the declarative `registry.yaml` into display-ready
//! [`EnrichedEntry`] records by pulling descriptions and code listings out of
//! the notebooks each entry references.
//!
//! ```text
//! registry.yaml ──(once)──▶ Manifest ──▶ RawEntry ──enrich──▶ EnrichedEntry
//!                                              │
//!                                   notebooks/**/*.ipynb
//! ```
//!
//! # Failure tiers
//!
//! - The registry file itself is content-integrity critical: a missing or
//!   unparseable file is returned as an error from every read.
//! - A notebook is best-effort: a dangling or malformed reference yields an
//!   entry with empty description and code, never an error.
//!
//! # Caching
//!
//! The manifest is parsed on first use and kept for the life of the
//! [`Registry`]. Concurrent first callers wait on an init lock, so the
//! source is read exactly once. A failed read is not cached. Call
//! [`Registry::reset`] to force a re-read.

use anyhow::{Context, Result};
use cookbook_core::links::LinkTemplates;
use cookbook_core::models::{Category, EnrichedEntry, Manifest, RawEntry};
use cookbook_core::notebook::{Notebook, NotebookContent};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;

// ═══════════════════════════════════════════════════════════════════════
// Manifest Sources
// ═══════════════════════════════════════════════════════════════════════

/// Where the registry text comes from.
pub trait ManifestSource: Send + Sync {
    /// Human-readable origin, used in errors and logs.
    fn describe(&self) -> String;

    /// Read the full registry document.
    fn read(&self) -> Result<String>;
}

/// Reads `registry.yaml` from disk.
#[derive(Debug, Clone)]
pub struct FileManifestSource {
    path: PathBuf,
}

impl FileManifestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ManifestSource for FileManifestSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> Result<String> {
        std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read registry: {}", self.path.display()))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Notebook Resolution
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum NotebookError {
    #[error("failed to read notebook: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse notebook: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Outcome of resolving an entry's notebook reference.
#[derive(Debug)]
pub enum NotebookLookup {
    Resolved(Notebook),
    NotFound(PathBuf),
    /// The file exists but could not be read or is not a notebook.
    Unreadable { path: PathBuf, error: NotebookError },
}

// ═══════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════

/// The cookbook's content registry.
///
/// Owns the manifest source, the content root that notebook references
/// resolve against, and the link templates. Share it behind an `Arc` when
/// serving concurrent requests.
pub struct Registry {
    source: Box<dyn ManifestSource>,
    content_root: PathBuf,
    links: LinkTemplates,
    manifest: OnceLock<Manifest>,
    init_lock: Mutex<()>,
}

impl Registry {
    pub fn new(
        source: Box<dyn ManifestSource>,
        content_root: impl Into<PathBuf>,
        links: LinkTemplates,
    ) -> Self {
        Self {
            source,
            content_root: content_root.into(),
            links,
            manifest: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// Build a registry reading `content.registry` under `content.root`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Box::new(FileManifestSource::new(config.content.registry_path())),
            config.content.root.clone(),
            config.links.clone(),
        )
    }

    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    pub fn links(&self) -> &LinkTemplates {
        &self.links
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// Whether the manifest has been parsed yet.
    pub fn is_loaded(&self) -> bool {
        self.manifest.get().is_some()
    }

    /// Drop the cached manifest so the next read parses the source again.
    pub fn reset(&mut self) {
        if self.manifest.take().is_some() {
            debug!(source = %self.source.describe(), "registry cache cleared");
        }
    }

    /// The parsed manifest, reading and parsing the source on first use.
    pub fn manifest(&self) -> Result<&Manifest> {
        if let Some(manifest) = self.manifest.get() {
            return Ok(manifest);
        }

        let _guard = self
            .init_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(manifest) = self.manifest.get() {
            return Ok(manifest);
        }

        let text = self.source.read()?;
        let manifest: Manifest = serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse registry: {}", self.source.describe()))?;
        info!(
            source = %self.source.describe(),
            etl = manifest.etl.len(),
            agents = manifest.agents.len(),
            configs = manifest.configs.len(),
            "registry loaded"
        );

        Ok(self.manifest.get_or_init(|| manifest))
    }

    /// Enriched entries for one category, in declared order.
    pub fn load_category_entries(&self, category: Category) -> Result<Vec<EnrichedEntry>> {
        let manifest = self.manifest()?;
        Ok(manifest
            .entries(category)
            .iter()
            .map(|raw| self.enrich_entry(raw))
            .collect())
    }

    /// Like [`load_category_entries`](Self::load_category_entries) but keyed
    /// by string. Unknown keys yield an empty list.
    pub fn entries_by_key(&self, key: &str) -> Result<Vec<EnrichedEntry>> {
        match Category::from_key(key) {
            Some(category) => self.load_category_entries(category),
            None => {
                // A broken registry is still an error for unknown keys.
                self.manifest()?;
                debug!(key, "unknown category requested");
                Ok(Vec::new())
            }
        }
    }

    pub fn etl_recipes(&self) -> Result<Vec<EnrichedEntry>> {
        self.load_category_entries(Category::Etl)
    }

    pub fn agents(&self) -> Result<Vec<EnrichedEntry>> {
        self.load_category_entries(Category::Agents)
    }

    pub fn configs(&self) -> Result<Vec<EnrichedEntry>> {
        self.load_category_entries(Category::Configs)
    }

    /// ETL recipes, then agents, then configs.
    pub fn all_entries(&self) -> Result<Vec<EnrichedEntry>> {
        let mut all = Vec::new();
        for category in Category::ALL {
            all.extend(self.load_category_entries(category)?);
        }
        Ok(all)
    }

    /// First entry in `category` with the given slug.
    pub fn find_entry(&self, category: Category, slug: &str) -> Result<Option<EnrichedEntry>> {
        let manifest = self.manifest()?;
        Ok(manifest
            .entries(category)
            .iter()
            .find(|raw| raw.slug == slug)
            .map(|raw| self.enrich_entry(raw)))
    }

    /// Resolve a notebook reference against the content root and parse it.
    pub fn lookup_notebook(&self, reference: &str) -> NotebookLookup {
        let path = self.content_root.join(reference);
        match std::fs::read_to_string(&path) {
            Ok(text) => match Notebook::from_json(&text) {
                Ok(notebook) => NotebookLookup::Resolved(notebook),
                Err(e) => NotebookLookup::Unreadable {
                    path,
                    error: e.into(),
                },
            },
            Err(e) if e.kind() == ErrorKind::NotFound => NotebookLookup::NotFound(path),
            Err(e) => NotebookLookup::Unreadable {
                path,
                error: e.into(),
            },
        }
    }

    /// Build the display-ready record for one raw entry.
    ///
    /// Never fails. An entry without a notebook reference touches no files
    /// and gets empty content and links. A dangling or malformed reference
    /// gets empty content but keeps its links.
    pub fn enrich_entry(&self, raw: &RawEntry) -> EnrichedEntry {
        let content = if raw.has_notebook() {
            match self.lookup_notebook(&raw.notebook) {
                NotebookLookup::Resolved(notebook) => NotebookContent::from_notebook(&notebook),
                NotebookLookup::NotFound(path) => {
                    debug!(slug = %raw.slug, path = %path.display(), "notebook not found");
                    NotebookContent::empty()
                }
                NotebookLookup::Unreadable { path, error } => {
                    warn!(slug = %raw.slug, path = %path.display(), %error, "notebook unusable");
                    NotebookContent::empty()
                }
            }
        } else {
            NotebookContent::empty()
        };

        EnrichedEntry {
            raw: raw.clone(),
            description: content.description,
            code: content.code,
            language: content.language,
            viewer_url: self.links.viewer_url(&raw.notebook),
            source_url: self.links.source_url(&raw.notebook),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn raw(slug: &str, notebook: &str) -> RawEntry {
        RawEntry {
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            notebook: notebook.to_string(),
            tags: vec!["t".to_string()],
            requires_api_key: true,
        }
    }

    #[test]
    fn empty_reference_yields_empty_content_and_links() {
        let tmp = TempDir::new().unwrap();
        let (registry, _) = counting_registry("{}", tmp.path());
        let entry = registry.enrich_entry(&raw("x", ""));
        assert_eq!(entry.description, "");
        assert_eq!(entry.code, "");
        assert_eq!(entry.language, "python");
        assert_eq!(entry.viewer_url, "");
        assert_eq!(entry.source_url, "");
        assert_eq!(entry.raw.tags, vec!["t".to_string()]);
        assert!(entry.raw.requires_api_key);
    }

    #[test]
    fn missing_notebook_keeps_links() {
        let tmp = TempDir::new().unwrap();
        let (registry, _) = counting_registry("{}", tmp.path());
        let entry = registry.enrich_entry(&raw("x", "notebooks/nope.ipynb"));
        assert_eq!(entry.description, "");
        assert_eq!(entry.code, "");
        assert_eq!(entry.language, "python");
        assert!(entry.viewer_url.ends_with("/blob/main/notebooks/nope.ipynb"));
        assert!(entry.source_url.starts_with("https://github.com/"));
    }

    #[test]
    fn malformed_notebook_degrades_like_missing() {
        let tmp = TempDir::new().unwrap();
        write_notebook(tmp.path(), "nb/bad.ipynb", r#"{"cells": 42}"#);
        let (registry, _) = counting_registry("{}", tmp.path());

        assert!(matches!(
            registry.lookup_notebook("nb/bad.ipynb"),
            NotebookLookup::Unreadable {
                error: NotebookError::Parse(_),
                ..
            }
        ));

        let entry = registry.enrich_entry(&raw("bad", "nb/bad.ipynb"));
        assert_eq!(entry.description, "");
        assert_eq!(entry.code, "");
        assert!(!entry.viewer_url.is_empty());
    }

    #[test]
    fn directory_reference_is_unreadable() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("nb/dir.ipynb")).unwrap();
        let (registry, _) = counting_registry("{}", tmp.path());
        assert!(matches!(
            registry.lookup_notebook("nb/dir.ipynb"),
            NotebookLookup::Unreadable { .. }
        ));
        assert!(matches!(
            registry.lookup_notebook("nb/absent.ipynb"),
            NotebookLookup::NotFound(_)
        ));
    }

    #[test]
    fn resolved_notebook_is_extracted() {
        let tmp = TempDir::new().unwrap();
        write_notebook(tmp.path(), "nb/agent.ipynb", AGENT_NOTEBOOK);
        let (registry, _) = counting_registry("{}", tmp.path());
        let entry = registry.enrich_entry(&raw("agent", "nb/agent.ipynb"));
        assert_eq!(entry.description, "A short agent demo.");
        assert_eq!(entry.code, "print(1)");
    }

    #[test]
    fn null_cell_source_keeps_other_cells() {
        let tmp = TempDir::new().unwrap();
        write_notebook(
            tmp.path(),
            "nb/partial.ipynb",
            r#"{"cells": [
              {"cell_type": "markdown", "source": ["Real prose."]},
              {"cell_type": "code", "source": null},
              {"cell_type": "code", "source": ["print(1)"]}
            ]}"#,
        );
        let (registry, _) = counting_registry("{}", tmp.path());
        assert!(matches!(
            registry.lookup_notebook("nb/partial.ipynb"),
            NotebookLookup::Resolved(_)
        ));
        let entry = registry.enrich_entry(&raw("partial", "nb/partial.ipynb"));
        assert_eq!(entry.description, "Real prose.");
        assert_eq!(entry.code, "print(1)");
    }

    #[test]
    fn category_reads_follow_declared_order() {
        let tmp = TempDir::new().unwrap();
        seed_content(tmp.path());
        let (registry, _) = counting_registry(REGISTRY_YAML, tmp.path());

        let etl = registry.etl_recipes().unwrap();
        let slugs: Vec<&str> = etl.iter().map(|e| e.slug()).collect();
        assert_eq!(slugs, ["csv-to-qdrant", "pdf-to-qdrant"]);
        assert_eq!(etl[0].description, "Read a CSV and upsert it.");
        assert_eq!(
            etl[0].code,
            "import pandas as pd\n\n\ndf = pd.read_csv('data.csv')"
        );
        assert_eq!(etl[1].code, "");
        assert!(!etl[1].source_url.is_empty());

        let configs = registry.configs().unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].description, "");
    }

    #[test]
    fn repeated_reads_parse_once() {
        let tmp = TempDir::new().unwrap();
        seed_content(tmp.path());
        let (registry, reads) = counting_registry(REGISTRY_YAML, tmp.path());

        assert!(!registry.is_loaded());
        let first = registry.load_category_entries(Category::Agents).unwrap();
        let second = registry.load_category_entries(Category::Agents).unwrap();
        assert_eq!(first, second);
        registry.configs().unwrap();
        registry.all_entries().unwrap();
        assert_eq!(reads.load(Ordering::SeqCst), 1);
        assert!(registry.is_loaded());
    }

    #[test]
    fn reset_forces_reread() {
        let tmp = TempDir::new().unwrap();
        let (mut registry, reads) = counting_registry(REGISTRY_YAML, tmp.path());
        registry.agents().unwrap();
        registry.reset();
        assert!(!registry.is_loaded());
        registry.agents().unwrap();
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn concurrent_first_reads_parse_once() {
        let tmp = TempDir::new().unwrap();
        seed_content(tmp.path());
        let (registry, reads) = counting_registry(REGISTRY_YAML, tmp.path());
        let registry = Arc::new(registry);

        std::thread::scope(|s| {
            for _ in 0..8 {
                let registry = registry.clone();
                s.spawn(move || {
                    assert_eq!(registry.agents().unwrap().len(), 2);
                });
            }
        });
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unknown_category_key_is_empty() {
        let tmp = TempDir::new().unwrap();
        let (registry, _) = counting_registry(REGISTRY_YAML, tmp.path());
        assert!(registry.entries_by_key("plugins").unwrap().is_empty());
        assert_eq!(registry.entries_by_key("agents").unwrap().len(), 2);
    }

    #[test]
    fn absent_category_key_is_empty() {
        let tmp = TempDir::new().unwrap();
        let (registry, _) = counting_registry("agents:\n  - slug: a\n    title: A\n", tmp.path());
        assert!(registry.etl_recipes().unwrap().is_empty());
        assert!(registry.configs().unwrap().is_empty());
        let agents = registry.agents().unwrap();
        assert_eq!(agents[0].viewer_url, "");
    }

    #[test]
    fn all_entries_concatenates_in_category_order() {
        let tmp = TempDir::new().unwrap();
        seed_content(tmp.path());
        let (registry, _) = counting_registry(REGISTRY_YAML, tmp.path());
        let slugs: Vec<String> = registry
            .all_entries()
            .unwrap()
            .iter()
            .map(|e| e.slug().to_string())
            .collect();
        assert_eq!(
            slugs,
            [
                "csv-to-qdrant",
                "pdf-to-qdrant",
                "rag-agent",
                "tool-agent",
                "hnsw-tuning"
            ]
        );
    }

    #[test]
    fn find_entry_returns_first_match() {
        let tmp = TempDir::new().unwrap();
        let yaml = "etl:\n  - slug: dup\n    title: First\n  - slug: dup\n    title: Second\n";
        let (registry, _) = counting_registry(yaml, tmp.path());
        let found = registry.find_entry(Category::Etl, "dup").unwrap().unwrap();
        assert_eq!(found.title(), "First");
        assert!(registry.find_entry(Category::Etl, "nope").unwrap().is_none());
        assert!(registry.find_entry(Category::Agents, "dup").unwrap().is_none());
    }

    #[test]
    fn missing_registry_file_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::new(
            Box::new(FileManifestSource::new(tmp.path().join("registry.yaml"))),
            tmp.path(),
            LinkTemplates::default(),
        );
        let err = registry.agents().unwrap_err();
        assert!(err.to_string().contains("Failed to read registry"));
        assert!(registry.entries_by_key("plugins").is_err());
        assert!(!registry.is_loaded());
    }

    #[test]
    fn malformed_registry_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let (registry, reads) = counting_registry("etl: [unclosed", tmp.path());
        let err = registry.all_entries().unwrap_err();
        assert!(err.to_string().contains("Failed to parse registry"));
        // Failures are not cached.
        assert!(registry.etl_recipes().is_err());
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }
}
