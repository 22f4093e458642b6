//! # Cookbook Registry
//!
//! Notebook-backed content registry for the Qdrant ETL cookbook.
//!
//! Authors describe ETL recipes, agent patterns, and configuration examples
//! in `registry.yaml`. Each entry points at a Jupyter notebook; the registry
//! pulls a description and the code listing out of that notebook and adds
//! Colab and GitHub links, producing records a site or API can render
//! directly.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐   ┌──────────────┐   ┌─────────────────┐
//! │ registry.yaml │──▶│   Registry   │──▶│  EnrichedEntry  │
//! │  (parsed once)│   │ enrich_entry │   │ desc+code+links │
//! └───────────────┘   └──────┬───────┘   └────────┬────────┘
//!                            │                    │
//!                   notebooks/**/*.ipynb   ┌──────┼────────┐
//!                                          ▼      ▼        ▼
//!                                        CLI   export    HTTP
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! cookbook list                       # all categories
//! cookbook get agents rag-agent       # one entry
//! cookbook search "pdf"               # substring search
//! cookbook export --output site/data/registry.json
//! cookbook check                      # dangling notebooks, duplicate slugs
//! cookbook serve                      # JSON API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logger`] | tracing subscriber setup |
//! | [`registry`] | Cached registry loader and entry enrichment |
//! | [`search`] | Substring search over entries |
//! | [`get`] | Single-entry lookup |
//! | [`list`] | Category listings |
//! | [`check`] | Registry integrity check |
//! | [`export`] | JSON export for static sites |
//! | [`server`] | Read-only HTTP API |

pub mod check;
pub mod config;
pub mod export;
pub mod get;
pub mod list;
pub mod logger;
pub mod registry;
pub mod search;
pub mod server;

pub use cookbook_core::links::LinkTemplates;
pub use cookbook_core::models::{Category, EnrichedEntry, Manifest, RawEntry};
