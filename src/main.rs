//! # Cookbook CLI (`cookbook`)
//!
//! Reads the cookbook's `registry.yaml`, enriches each entry from its
//! notebook, and lists, searches, exports, checks, or serves the result.
//!
//! ## Usage
//!
//! ```bash
//! cookbook [--config ./cookbook.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cookbook list` | List entries per category |
//! | `cookbook get <category> <slug>` | Show one entry with its description and code |
//! | `cookbook search "<query>"` | Case-insensitive substring search |
//! | `cookbook export` | Write all enriched entries as JSON |
//! | `cookbook check` | Report missing notebooks, duplicate slugs, orphans |
//! | `cookbook serve` | Start the read-only JSON API |

use clap::{Parser, Subcommand};
use cookbook_registry::config::{self, Config};
use cookbook_registry::registry::Registry;
use cookbook_registry::{check, export, get, list, logger, search, server, Category};
use std::path::PathBuf;
use std::sync::Arc;

/// Cookbook registry CLI.
///
/// Without `--config`, reads `./registry.yaml` and resolves notebooks
/// against the current directory.
#[derive(Parser)]
#[command(
    name = "cookbook",
    about = "Notebook-backed content registry for the Qdrant ETL cookbook",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List entries, grouped by category.
    List {
        /// Only list one category: `etl`, `agents`, or `configs`.
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,
    },

    /// Show a single entry.
    ///
    /// When a slug is declared twice in a category, the first one is shown.
    Get {
        /// Category: `etl`, `agents`, or `configs`.
        #[arg(value_parser = parse_category)]
        category: Category,

        /// Entry slug.
        slug: String,

        /// Print the enriched entry as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Search entries by slug, title, description, and tags.
    Search {
        /// The search query string.
        query: String,

        /// Restrict the search to one category.
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,

        /// Maximum number of results to print.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Export every enriched entry as JSON.
    ///
    /// Writes to stdout unless `--output` is given.
    Export {
        /// Output file. Parent directories are created.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check the registry for broken notebook references.
    ///
    /// Exits non-zero on missing or unreadable notebooks and duplicate slugs.
    Check,

    /// Start the read-only JSON API on `[server].bind`.
    Serve,
}

fn parse_category(s: &str) -> Result<Category, String> {
    Category::from_key(s).ok_or_else(|| {
        format!(
            "unknown category '{}': expected one of {}",
            s,
            Category::ALL.map(|c| c.key()).join(", ")
        )
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::minimal(),
    };
    logger::init(&cfg.logging.level)?;

    let registry = Registry::from_config(&cfg);

    match cli.command {
        Commands::List { category } => {
            list::run_list(&registry, category)?;
        }
        Commands::Get {
            category,
            slug,
            json,
        } => {
            get::run_get(&registry, category, &slug, json)?;
        }
        Commands::Search {
            query,
            category,
            limit,
        } => {
            search::run_search(&registry, &query, category, limit)?;
        }
        Commands::Export { output } => {
            export::run_export(&registry, output.as_deref())?;
        }
        Commands::Check => {
            check::run_check(&registry, &cfg)?;
        }
        Commands::Serve => {
            server::run_server(&cfg, Arc::new(registry)).await?;
        }
    }

    Ok(())
}
