//! # lumos-cli — Command-Line Front End
//!
//! Provides the `lumos` binary over the validation pipeline. The parser
//! is a separate tool; this CLI consumes its output records.
//!
//! ## Subcommands
//!
//! - `lumos check`: validate records and print the grouped report.
//! - `lumos order`: print files in dependency order.
//! - `lumos schemas`: list registered attribute schemas.
//!
//! ```bash
//! lumos check out/records.json --enable can_bus --strict
//! lumos --config lumos.yaml order out/*.yaml
//! ```
//!
//! Exit status is 0 on success and 1 when any error diagnostic is produced
//! or the run cannot start.

pub mod check;
pub mod order;
pub mod schemas;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use lumos_core::{FileUnit, ValidationConfig};

/// One records document: a single file record or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordDocument {
    Many(Vec<FileUnit>),
    One(Box<FileUnit>),
}

/// Load file records from JSON (`.json`) or YAML documents.
pub fn load_records(paths: &[PathBuf]) -> Result<Vec<FileUnit>> {
    let mut units = Vec::new();
    for path in paths {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read records from {}", path.display()))?;
        let is_json = path.extension().is_some_and(|e| e == "json");
        let doc: RecordDocument = if is_json {
            serde_json::from_str(&text)
                .with_context(|| format!("malformed JSON records in {}", path.display()))?
        } else {
            serde_yaml::from_str(&text)
                .with_context(|| format!("malformed YAML records in {}", path.display()))?
        };
        match doc {
            RecordDocument::Many(list) => units.extend(list),
            RecordDocument::One(unit) => units.push(*unit),
        }
    }
    tracing::debug!(files = units.len(), "records loaded");
    Ok(units)
}

/// Command-line additions to the configuration file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Searched before the configured directories.
    pub search_paths: Vec<PathBuf>,
    pub schema_files: Vec<PathBuf>,
    pub enable: Vec<String>,
    pub strict: bool,
}

/// Load `config_path` (or defaults) and apply `overrides`.
pub fn build_config(config_path: Option<&Path>, overrides: &Overrides) -> Result<ValidationConfig> {
    let mut config = match config_path {
        Some(path) => ValidationConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => ValidationConfig::default(),
    };

    if !overrides.search_paths.is_empty() {
        let mut search = overrides.search_paths.clone();
        search.extend(config.search_paths.drain(..));
        config.search_paths = search;
    }
    config
        .attributes
        .custom_schemas
        .extend(overrides.schema_files.iter().cloned());
    for name in &overrides.enable {
        if !config.attributes.enabled_schemas.contains(name) {
            config.attributes.enabled_schemas.push(name.clone());
        }
    }
    if overrides.strict {
        config.attributes.strict_mode = true;
    }
    Ok(config)
}
