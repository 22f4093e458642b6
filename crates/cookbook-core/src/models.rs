//! Core data models for the cookbook registry.
//!
//! [`RawEntry`] is what authors write in `registry.yaml`. [`EnrichedEntry`]
//! is what callers receive: the raw fields plus content pulled out of the
//! referenced notebook and the derived viewer links.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One of the three fixed content groupings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Etl,
    Agents,
    Configs,
}

impl Category {
    /// All categories in display order: ETL, then agents, then configs.
    pub const ALL: [Category; 3] = [Category::Etl, Category::Agents, Category::Configs];

    /// The key used in `registry.yaml` and in URLs.
    pub fn key(self) -> &'static str {
        match self {
            Category::Etl => "etl",
            Category::Agents => "agents",
            Category::Configs => "configs",
        }
    }

    /// Human-readable section heading.
    pub fn label(self) -> &'static str {
        match self {
            Category::Etl => "ETL Recipes",
            Category::Agents => "Agents",
            Category::Configs => "Configs",
        }
    }

    /// Parse a category key. Unknown keys return `None`.
    pub fn from_key(key: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.key() == key)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A registry entry exactly as declared in `registry.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    /// URL-safe identifier, assumed unique within its category.
    pub slug: String,
    pub title: String,
    /// Notebook path relative to the content root. Empty when the entry has
    /// no backing notebook.
    #[serde(default)]
    pub notebook: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub requires_api_key: bool,
}

impl RawEntry {
    pub fn has_notebook(&self) -> bool {
        !self.notebook.is_empty()
    }
}

/// A display-ready entry. Built fresh on every read and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedEntry {
    #[serde(flatten)]
    pub raw: RawEntry,
    pub description: String,
    pub code: String,
    pub language: String,
    /// Notebook viewer link (Colab). Empty when there is no notebook.
    pub viewer_url: String,
    /// Source host link (GitHub). Empty when there is no notebook.
    pub source_url: String,
}

impl EnrichedEntry {
    pub fn slug(&self) -> &str {
        &self.raw.slug
    }

    pub fn title(&self) -> &str {
        &self.raw.title
    }
}

/// Parsed `registry.yaml`.
///
/// A category whose key is absent (or present with no value) deserializes as
/// an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub etl: Vec<RawEntry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub agents: Vec<RawEntry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub configs: Vec<RawEntry>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<RawEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<RawEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Manifest {
    /// Raw entries for a category, in declared order.
    pub fn entries(&self, category: Category) -> &[RawEntry] {
        match category {
            Category::Etl => &self.etl,
            Category::Agents => &self.agents,
            Category::Configs => &self.configs,
        }
    }

    /// Total number of declared entries across all categories.
    pub fn len(&self) -> usize {
        self.etl.len() + self.agents.len() + self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
