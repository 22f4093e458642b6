//! TOML configuration for the `cookbook` binary.
//!
//! Every section is optional. A missing `--config` flag falls back to
//! [`Config::minimal`], which reads `registry.yaml` from the current
//! directory and links to the upstream cookbook repository.

use anyhow::{Context, Result};
use cookbook_core::links::LinkTemplates;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::logger;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub links: LinkTemplates,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    /// Directory that notebook references and `registry` resolve against.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Registry file, relative to `root` unless absolute.
    #[serde(default = "default_registry")]
    pub registry: PathBuf,
    /// Globs (relative to `root`) that `cookbook check` scans for orphans.
    #[serde(default = "default_notebook_globs")]
    pub notebook_globs: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            registry: default_registry(),
            notebook_globs: default_notebook_globs(),
        }
    }
}

impl ContentConfig {
    pub fn registry_path(&self) -> PathBuf {
        self.root.join(&self.registry)
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_registry() -> PathBuf {
    PathBuf::from("registry.yaml")
}
fn default_notebook_globs() -> Vec<String> {
    vec!["notebooks/**/*.ipynb".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Configuration used when no config file is given.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    // Validate links
    let repo = &config.links.repo;
    match repo.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {}
        _ => anyhow::bail!("links.repo must be in 'owner/name' form, got '{}'", repo),
    }

    if config.links.branch.trim().is_empty() {
        anyhow::bail!("links.branch must not be empty");
    }

    for (key, base) in [
        ("links.viewer_base", &config.links.viewer_base),
        ("links.source_base", &config.links.source_base),
    ] {
        if !(base.starts_with("https://") || base.starts_with("http://")) {
            anyhow::bail!("{} must be an http(s) URL, got '{}'", key, base);
        }
    }

    // Validate server
    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    // Validate logging
    logger::parse_level(&config.logging.level)
        .with_context(|| "Invalid logging.level")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(body: &str) -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cookbook.toml");
        fs::write(&path, body).unwrap();
        (tmp, path)
    }

    #[test]
    fn empty_file_uses_defaults() {
        let (_tmp, path) = write_config("");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.content.registry_path(), PathBuf::from("./registry.yaml"));
        assert_eq!(cfg.links, LinkTemplates::default());
        assert_eq!(cfg.server.bind, "127.0.0.1:7340");
        assert_eq!(cfg.logging.level, "warn");
    }

    #[test]
    fn full_file_parses() {
        let (_tmp, path) = write_config(
            r#"
[content]
root = "/srv/cookbook"
registry = "content/registry.yaml"
notebook_globs = ["**/*.ipynb"]

[links]
repo = "acme/recipes"
branch = "dev"

[server]
bind = "0.0.0.0:8080"

[logging]
level = "debug"
"#,
        );
        let cfg = load_config(&path).unwrap();
        assert_eq!(
            cfg.content.registry_path(),
            PathBuf::from("/srv/cookbook/content/registry.yaml")
        );
        assert_eq!(cfg.links.repo, "acme/recipes");
        assert_eq!(cfg.links.branch, "dev");
        assert_eq!(cfg.links.source_base, "https://github.com");
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn rejects_bad_repo() {
        for repo in ["no-slash", "/name", "owner/", "a/b/c"] {
            let (_tmp, path) = write_config(&format!("[links]\nrepo = \"{}\"\n", repo));
            let err = load_config(&path).unwrap_err();
            assert!(err.to_string().contains("owner/name"), "repo {repo}: {err}");
        }
    }

    #[test]
    fn rejects_non_http_base() {
        let (_tmp, path) = write_config("[links]\nviewer_base = \"ftp://x\"\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn rejects_bad_log_level() {
        let (_tmp, path) = write_config("[logging]\nlevel = \"loud\"\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_config(&tmp.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
