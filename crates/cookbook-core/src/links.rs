//! Derived viewer and source links for notebook-backed entries.

use serde::Deserialize;

pub const DEFAULT_REPO: &str = "thierrypdamiba/qdrant-etl-cookbook";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_VIEWER_BASE: &str = "https://colab.research.google.com/github";
pub const DEFAULT_SOURCE_BASE: &str = "https://github.com";

/// URL templates for a notebook path inside the cookbook repository.
///
/// ```rust
/// use cookbook_core::links::LinkTemplates;
///
/// let links = LinkTemplates::default();
/// assert_eq!(
///     links.source_url("notebooks/etl/csv_to_qdrant.ipynb"),
///     "https://github.com/thierrypdamiba/qdrant-etl-cookbook/blob/main/notebooks/etl/csv_to_qdrant.ipynb"
/// );
/// assert_eq!(links.viewer_url(""), "");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkTemplates {
    /// Repository identifier in `owner/name` form.
    #[serde(default = "default_repo")]
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_viewer_base")]
    pub viewer_base: String,
    #[serde(default = "default_source_base")]
    pub source_base: String,
}

fn default_repo() -> String {
    DEFAULT_REPO.to_string()
}
fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}
fn default_viewer_base() -> String {
    DEFAULT_VIEWER_BASE.to_string()
}
fn default_source_base() -> String {
    DEFAULT_SOURCE_BASE.to_string()
}

impl Default for LinkTemplates {
    fn default() -> Self {
        Self {
            repo: default_repo(),
            branch: default_branch(),
            viewer_base: default_viewer_base(),
            source_base: default_source_base(),
        }
    }
}

impl LinkTemplates {
    /// Notebook viewer (Colab) link, or `""` for an empty reference.
    pub fn viewer_url(&self, notebook: &str) -> String {
        self.render(&self.viewer_base, notebook)
    }

    /// Source host (GitHub) link, or `""` for an empty reference.
    pub fn source_url(&self, notebook: &str) -> String {
        self.render(&self.source_base, notebook)
    }

    fn render(&self, base: &str, notebook: &str) -> String {
        if notebook.is_empty() {
            return String::new();
        }
        format!(
            "{}/{}/blob/{}/{}",
            base.trim_end_matches('/'),
            self.repo,
            self.branch,
            notebook
        )
    }
}
