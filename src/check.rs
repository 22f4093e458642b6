//! Registry integrity check (`cookbook check`).
//!
//! Reading the registry never fails on a bad notebook, so broken references
//! only show up as blank cards. This command surfaces them for authors:
//! dangling or malformed notebooks, duplicate slugs, notebooks that yield no
//! content, and notebooks on disk that no entry references.

use anyhow::{bail, Result};
use cookbook_core::models::{Category, RawEntry};
use cookbook_core::notebook::NotebookContent;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use walkdir::WalkDir;

use crate::config::Config;
use crate::registry::{NotebookLookup, Registry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    Ok,
    NoNotebook,
    Missing,
    Unreadable(String),
    /// Notebook parsed but yields neither description nor code.
    Empty,
}

impl EntryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EntryStatus::Ok => "OK",
            EntryStatus::NoNotebook => "NO NOTEBOOK",
            EntryStatus::Missing => "MISSING",
            EntryStatus::Unreadable(_) => "UNREADABLE",
            EntryStatus::Empty => "EMPTY",
        }
    }

    pub fn is_problem(&self) -> bool {
        matches!(self, EntryStatus::Missing | EntryStatus::Unreadable(_))
    }
}

#[derive(Debug, Clone)]
pub struct EntryCheck {
    pub category: Category,
    pub slug: String,
    pub notebook: String,
    pub status: EntryStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSlug {
    pub category: Category,
    pub slug: String,
    /// Declared positions, first one wins.
    pub positions: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub entries: Vec<EntryCheck>,
    pub duplicates: Vec<DuplicateSlug>,
    /// Notebook paths (relative to the content root) no entry references.
    pub orphans: Vec<String>,
}

impl CheckReport {
    /// Missing or unreadable notebooks and duplicate slugs are problems.
    /// Empty notebooks and orphans are only reported.
    pub fn has_problems(&self) -> bool {
        !self.duplicates.is_empty() || self.entries.iter().any(|e| e.status.is_problem())
    }

    pub fn problem_count(&self) -> usize {
        self.duplicates.len() + self.entries.iter().filter(|e| e.status.is_problem()).count()
    }
}

/// Core check returning structured data (used by CLI and tests).
pub fn check_registry(registry: &Registry, config: &Config) -> Result<CheckReport> {
    let manifest = registry.manifest()?;
    let mut report = CheckReport::default();
    let mut referenced: HashSet<String> = HashSet::new();

    for category in Category::ALL {
        let raws = manifest.entries(category);

        let mut seen: Vec<(&str, Vec<usize>)> = Vec::new();
        for (i, raw) in raws.iter().enumerate() {
            match seen.iter_mut().find(|(slug, _)| *slug == raw.slug) {
                Some((_, positions)) => positions.push(i),
                None => seen.push((&raw.slug, vec![i])),
            }
        }
        report.duplicates.extend(
            seen.into_iter()
                .filter(|(_, positions)| positions.len() > 1)
                .map(|(slug, positions)| DuplicateSlug {
                    category,
                    slug: slug.to_string(),
                    positions,
                }),
        );

        for raw in raws {
            if raw.has_notebook() {
                referenced.insert(normalize(&raw.notebook));
            }
            report.entries.push(EntryCheck {
                category,
                slug: raw.slug.clone(),
                notebook: raw.notebook.clone(),
                status: entry_status(registry, raw),
            });
        }
    }

    report.orphans = scan_notebooks(registry.content_root(), &config.content.notebook_globs)?
        .into_iter()
        .filter(|rel| !referenced.contains(rel))
        .collect();

    Ok(report)
}

/// Status of one entry's notebook reference. Reads the notebook once.
pub fn entry_status(registry: &Registry, raw: &RawEntry) -> EntryStatus {
    if !raw.has_notebook() {
        return EntryStatus::NoNotebook;
    }
    match registry.lookup_notebook(&raw.notebook) {
        NotebookLookup::Resolved(nb) => {
            if NotebookContent::from_notebook(&nb).is_empty() {
                EntryStatus::Empty
            } else {
                EntryStatus::Ok
            }
        }
        NotebookLookup::NotFound(_) => EntryStatus::Missing,
        NotebookLookup::Unreadable { error, .. } => EntryStatus::Unreadable(error.to_string()),
    }
}

/// Notebook paths under `root` matching `globs`, sorted, `/`-separated.
fn scan_notebooks(root: &Path, globs: &[String]) -> Result<BTreeSet<String>> {
    let mut found = BTreeSet::new();
    if globs.is_empty() || !root.is_dir() {
        return Ok(found);
    }

    let include_set = build_globset(globs)?;
    let exclude_set = build_globset(&[
        "**/.git/**".to_string(),
        "**/.ipynb_checkpoints/**".to_string(),
        "**/node_modules/**".to_string(),
    ])?;

    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = normalize(&relative.to_string_lossy());

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }
        found.insert(rel_str);
    }

    Ok(found)
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches("./").to_string()
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// CLI entry point. Prints the report and fails when problems exist.
pub fn run_check(registry: &Registry, config: &Config) -> Result<()> {
    let report = check_registry(registry, config)?;

    println!("{:<8} {:<28} {:<12} NOTEBOOK", "CATEGORY", "SLUG", "STATUS");
    for e in &report.entries {
        let notebook = if e.notebook.is_empty() {
            "-"
        } else {
            e.notebook.as_str()
        };
        println!(
            "{:<8} {:<28} {:<12} {}",
            e.category.key(),
            e.slug,
            e.status.label(),
            notebook
        );
        if let EntryStatus::Unreadable(reason) = &e.status {
            println!("{:<8} {:<28} {:<12} {}", "", "", "", reason);
        }
    }

    if !report.duplicates.is_empty() {
        println!();
        println!("Duplicate slugs (first declaration wins):");
        for d in &report.duplicates {
            println!(
                "  {}/{} declared at positions {:?}",
                d.category, d.slug, d.positions
            );
        }
    }

    if !report.orphans.is_empty() {
        println!();
        println!("Unreferenced notebooks:");
        for o in &report.orphans {
            println!("  {}", o);
        }
    }

    println!();
    if report.has_problems() {
        bail!(
            "registry check failed: {} problem(s) in {}",
            report.problem_count(),
            registry.source_description()
        );
    }
    println!("registry ok: {} entries checked", report.entries.len());
    Ok(())
}
