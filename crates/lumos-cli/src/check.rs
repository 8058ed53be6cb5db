//! # Check Subcommand
//!
//! Validates parser output records and prints the report, grouped by file
//! as text or as one JSON document.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use lumos_core::Diagnostic;
use lumos_validate::{registry_for, SymbolStatistics, ValidationResult, Validator};

use crate::{build_config, load_records, Overrides};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Arguments for `lumos check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Record documents (JSON or YAML) produced by the parser.
    #[arg(value_name = "RECORDS", required = true)]
    pub records: Vec<PathBuf>,

    /// Import search directory, tried before configured ones. Repeatable.
    #[arg(short = 'I', long = "search-path", value_name = "DIR")]
    pub search_paths: Vec<PathBuf>,

    /// Extra attribute schema document. Repeatable.
    #[arg(long = "schema", value_name = "FILE")]
    pub schemas: Vec<PathBuf>,

    /// Enable an attribute schema by name. Repeatable.
    #[arg(long = "enable", value_name = "NAME")]
    pub enable: Vec<String>,

    /// Treat unknown attributes as errors.
    #[arg(long)]
    pub strict: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl CheckArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            search_paths: self.search_paths.clone(),
            schema_files: self.schemas.clone(),
            enable: self.enable.clone(),
            strict: self.strict,
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    success: bool,
    errors: Vec<&'a Diagnostic>,
    warnings: Vec<&'a Diagnostic>,
    statistics: SymbolStatistics,
}

/// Run the check. Returns the process exit code.
pub fn run_check(args: &CheckArgs, config_path: Option<&Path>) -> Result<u8> {
    let config = build_config(config_path, &args.overrides())?;
    let registry = registry_for(&config).context("failed to load attribute schemas")?;
    let validator = Validator::new(&config, &registry).context("invalid validation setup")?;

    let units = load_records(&args.records)?;
    let result = validator.validate(&units);

    print!("{}", render(&result, args.format)?);
    Ok(if result.is_success() { 0 } else { 1 })
}

fn render(result: &ValidationResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(result.report().render()),
        OutputFormat::Json => {
            let doc = JsonReport {
                success: result.is_success(),
                errors: result.errors(),
                warnings: result.warnings(),
                statistics: result.symbol_table().statistics(),
            };
            let mut text = serde_json::to_string_pretty(&doc)?;
            text.push('\n');
            Ok(text)
        }
    }
}
