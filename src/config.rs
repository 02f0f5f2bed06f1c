//! TOML configuration.
//!
//! ```toml
//! [db]
//! path = "./data/brands.sqlite"
//!
//! [pipeline]
//! collection = "brands"
//! input = "./data/brands.json"
//!
//! [export]
//! path = "./data/brands-transformed.json"
//!
//! [seed]
//! docs_path = "./docs/seed-data-cases.xlsx"
//! ```
//!
//! Only `[db]` is required; every other section has defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Raw JSON records imported before `transform` / `run`.
    #[serde(default)]
    pub input: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            input: None,
        }
    }
}

fn default_collection() -> String {
    "brands".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExportConfig {
    /// Where `export` writes when no `--output` is given. Unset means stdout
    /// for `export` and [`DEFAULT_EXPORT_FILE`] beside the database for `run`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// File name `run` exports to when `[export].path` is unset.
pub const DEFAULT_EXPORT_FILE: &str = "brands-transformed.json";

#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    #[serde(default = "default_docs_path")]
    pub docs_path: PathBuf,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            docs_path: default_docs_path(),
        }
    }
}

fn default_docs_path() -> PathBuf {
    PathBuf::from("./docs/seed-data-cases.xlsx")
}

impl Config {
    /// Defaults around a database path. Used by tests and library callers.
    pub fn with_db_path(path: impl Into<PathBuf>) -> Self {
        Self {
            db: DbConfig { path: path.into() },
            pipeline: PipelineConfig::default(),
            export: ExportConfig::default(),
            seed: SeedConfig::default(),
        }
    }

    /// Export target of the full pipeline: `[export].path`, else
    /// [`DEFAULT_EXPORT_FILE`] in the database's directory.
    pub fn pipeline_export_path(&self) -> PathBuf {
        match &self.export.path {
            Some(path) => path.clone(),
            None => self
                .db
                .path
                .parent()
                .unwrap_or(Path::new("."))
                .join(DEFAULT_EXPORT_FILE),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.pipeline.collection.trim().is_empty() {
        anyhow::bail!("pipeline.collection must not be empty");
    }

    if config.db.path.as_os_str().is_empty() {
        anyhow::bail!("db.path must not be empty");
    }

    Ok(config)
}
