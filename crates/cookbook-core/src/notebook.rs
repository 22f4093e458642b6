//! Jupyter notebook parsing and content extraction.
//!
//! Only the parts of the nbformat document that the registry needs are
//! modelled: the ordered cell list, each cell's type, and its source text.
//! Everything else (outputs, metadata, execution counts) is ignored.
//!
//! # Extraction rules
//!
//! - **Description**: the first markdown cell that still has text after
//!   dropping blank lines, headings, the "Open in Colab" badge line, and the
//!   `**Requirements` line. Remaining lines are joined with single spaces.
//! - **Code**: every code cell in document order, skipping empty cells and
//!   `!pip` install cells, joined with a blank line.
//!
//! # Example
//!
//! ```rust
//! use cookbook_core::notebook::{extract_code, extract_description, Notebook};
//!
//! let nb = Notebook::from_json(r##"{"cells": [
//!     {"cell_type": "markdown", "source": ["# Title\n", "\n", "A short agent demo.\n"]},
//!     {"cell_type": "code", "source": ["!pip install foo"]},
//!     {"cell_type": "code", "source": ["print(1)"]}
//! ]}"##).unwrap();
//!
//! assert_eq!(extract_description(&nb), "A short agent demo.");
//! assert_eq!(extract_code(&nb), "print(1)");
//! ```

use serde::{Deserialize, Deserializer};

/// Language reported for every entry. Not inferred from notebook metadata.
pub const LANGUAGE: &str = "python";

/// Lines containing this host are the Colab badge, not prose.
const VIEWER_BADGE_MARKER: &str = "colab.research.google.com";
const REQUIREMENTS_MARKER: &str = "**Requirements";
const INSTALL_DIRECTIVE: &str = "!pip";
const CODE_SEPARATOR: &str = "\n\n";

/// A parsed notebook document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Notebook {
    #[serde(default, deserialize_with = "null_as_default")]
    pub cells: Vec<Cell>,
}

impl Notebook {
    pub fn from_json(text: &str) -> Result<Notebook, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// A single notebook cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Cell {
    #[serde(default, deserialize_with = "null_as_default")]
    pub cell_type: CellType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: CellSource,
}

/// An explicit `null` reads the same as an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Cell {
    pub fn text(&self) -> String {
        self.source.text()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    #[serde(alias = "descriptive")]
    Markdown,
    Code,
    #[default]
    #[serde(other)]
    Other,
}

/// Cell source text. nbformat allows either a list of lines (each keeping
/// its trailing newline) or one multi-line string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CellSource {
    Lines(Vec<String>),
    Text(String),
}

impl Default for CellSource {
    fn default() -> Self {
        CellSource::Lines(Vec::new())
    }
}

impl CellSource {
    /// The full source, lines concatenated with no added separator.
    pub fn text(&self) -> String {
        match self {
            CellSource::Lines(lines) => lines.concat(),
            CellSource::Text(text) => text.clone(),
        }
    }
}

/// Description and code pulled out of a notebook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookContent {
    pub description: String,
    pub code: String,
    pub language: String,
}

impl NotebookContent {
    /// Content for an entry whose notebook is absent or unusable.
    pub fn empty() -> Self {
        Self {
            description: String::new(),
            code: String::new(),
            language: LANGUAGE.to_string(),
        }
    }

    pub fn from_notebook(notebook: &Notebook) -> Self {
        Self {
            description: extract_description(notebook),
            code: extract_code(notebook),
            language: LANGUAGE.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_empty() && self.code.is_empty()
    }
}

/// Extract the descriptive paragraph from the first qualifying markdown cell.
///
/// Returns an empty string when no markdown cell has prose left after
/// filtering.
pub fn extract_description(notebook: &Notebook) -> String {
    for cell in &notebook.cells {
        if cell.cell_type != CellType::Markdown {
            continue;
        }
        let text = cell.text();
        let lines: Vec<&str> = text.split('\n').filter(|l| is_prose_line(l)).collect();
        if !lines.is_empty() {
            return lines.join(" ").trim().to_string();
        }
    }
    String::new()
}

fn is_prose_line(line: &str) -> bool {
    !line.trim().is_empty()
        && !line.starts_with('#')
        && !line.contains(VIEWER_BADGE_MARKER)
        && !line.starts_with(REQUIREMENTS_MARKER)
}

/// Concatenate every qualifying code cell, in order, separated by a blank line.
pub fn extract_code(notebook: &Notebook) -> String {
    let blocks: Vec<String> = notebook
        .cells
        .iter()
        .filter(|cell| cell.cell_type == CellType::Code)
        .map(Cell::text)
        .filter(|src| {
            let trimmed = src.trim();
            !trimmed.is_empty() && !trimmed.starts_with(INSTALL_DIRECTIVE)
        })
        .collect();
    blocks.join(CODE_SEPARATOR)
}
