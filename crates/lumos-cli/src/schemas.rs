//! # Schemas Subcommand
//!
//! Lists the attribute schemas a run would see: the bundled ones, then
//! any configured or named schema files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use lumos_schema::{Attachment, SchemaRegistry};
use lumos_validate::registry_for;

use crate::{build_config, Overrides};

/// Arguments for `lumos schemas`.
#[derive(Args, Debug)]
pub struct SchemasArgs {
    /// Extra attribute schema document. Repeatable.
    #[arg(long = "schema", value_name = "FILE")]
    pub schemas: Vec<PathBuf>,
}

/// One line per schema: name, version and declared key counts.
pub fn describe(registry: &SchemaRegistry) -> Vec<String> {
    registry
        .iter()
        .map(|s| {
            format!(
                "{} {} (struct: {}, field: {}, enum: {})",
                s.name(),
                s.version,
                s.section(Attachment::Struct).len(),
                s.section(Attachment::Field).len(),
                s.section(Attachment::Enum).len()
            )
        })
        .collect()
}

pub fn run_schemas(args: &SchemasArgs, config_path: Option<&Path>) -> Result<u8> {
    let overrides = Overrides {
        schema_files: args.schemas.clone(),
        ..Overrides::default()
    };
    let config = build_config(config_path, &overrides)?;
    let registry = registry_for(&config).context("failed to load attribute schemas")?;
    for line in describe(&registry) {
        println!("{line}");
    }
    Ok(0)
}
