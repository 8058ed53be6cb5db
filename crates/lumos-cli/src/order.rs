//! # Order Subcommand
//!
//! Prints the files of a record set so that every file follows the files
//! it imports. Fails when the imports form a cycle.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use lumos_core::DiagnosticCollector;
use lumos_validate::{DependencyGraph, ImportResolver};

use crate::{build_config, load_records, Overrides};

/// Arguments for `lumos order`.
#[derive(Args, Debug)]
pub struct OrderArgs {
    /// Record documents (JSON or YAML) produced by the parser.
    #[arg(value_name = "RECORDS", required = true)]
    pub records: Vec<PathBuf>,

    /// Import search directory, tried before configured ones. Repeatable.
    #[arg(short = 'I', long = "search-path", value_name = "DIR")]
    pub search_paths: Vec<PathBuf>,
}

/// Compute the processing order, one path per line.
pub fn processing_order(args: &OrderArgs, config_path: Option<&Path>) -> Result<(Vec<PathBuf>, DiagnosticCollector)> {
    let overrides = Overrides {
        search_paths: args.search_paths.clone(),
        ..Overrides::default()
    };
    let config = build_config(config_path, &overrides)?;
    let units = load_records(&args.records)?;

    let resolver = ImportResolver::new(config.search_paths.clone());
    let mut out = DiagnosticCollector::new();
    let graph = DependencyGraph::build(&units, &resolver, &mut out);
    graph.check_cycles(&mut out);

    let order = graph.topological_order().unwrap_or_default();
    Ok((order, out))
}

/// Run the subcommand. Returns the process exit code.
pub fn run_order(args: &OrderArgs, config_path: Option<&Path>) -> Result<u8> {
    let (order, diagnostics) = processing_order(args, config_path)?;
    let failed = diagnostics.has_errors();
    for d in diagnostics.into_sorted() {
        eprintln!("{d}");
    }
    if failed {
        return Ok(1);
    }
    for path in &order {
        println!("{}", path.display());
    }
    Ok(0)
}
