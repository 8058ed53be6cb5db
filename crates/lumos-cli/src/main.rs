//! # lumos CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lumos_cli::check::{run_check, CheckArgs};
use lumos_cli::order::{run_order, OrderArgs};
use lumos_cli::schemas::{run_schemas, SchemasArgs};

/// Lumos IDL validator.
///
/// Checks parser output records for resolution, import, structural and
/// attribute errors before code generation.
#[derive(Parser, Debug)]
#[command(name = "lumos", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate parser output records.
    Check(CheckArgs),

    /// Print files in dependency order.
    Order(OrderArgs),

    /// List registered attribute schemas.
    Schemas(SchemasArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let logs = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        logs.json().init();
    } else {
        logs.init();
    }

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Check(args) => run_check(&args, config),
        Commands::Order(args) => run_order(&args, config),
        Commands::Schemas(args) => run_schemas(&args, config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
