//! windscope - Command-line tool for turbine archive analytics
//!
//! Runs the series, generation and power-curve queries against an archive
//! store and renders the results as tables, JSON or CSV.

mod commands;
mod config;
mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use windscope_engine::ArchiveEngine;

use crate::config::Config;
use crate::output::{OutputContext, OutputFormat};

#[derive(Parser)]
#[command(name = "windscope")]
#[command(author, version, about = "Turbine archive analytics")]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "WINDSCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// Archive root directory (overrides the configured store)
    #[arg(long, env = "WINDSCOPE_STORE_ROOT")]
    store_root: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Date range and turbine selection shared by every query
#[derive(clap::Args, Debug, Clone)]
pub struct Selection {
    /// First day (YYYY-MM-DD), defaults to yesterday
    #[arg(long)]
    pub from: Option<String>,

    /// Last day (YYYY-MM-DD), defaults to yesterday
    #[arg(long)]
    pub to: Option<String>,

    /// Turbine id, repeatable (defaults to every known turbine)
    #[arg(short, long = "turbine")]
    pub turbines: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Time series of selected parameters
    Series {
        #[command(flatten)]
        selection: Selection,

        /// Parameter display name, repeatable (defaults to all)
        #[arg(short, long = "param")]
        params: Vec<String>,

        /// Aggregation kind: Average, Min, Max (repeatable)
        #[arg(short, long = "agg")]
        aggs: Vec<String>,
    },

    /// Daily generation and availability
    Generation {
        #[command(flatten)]
        selection: Selection,
    },

    /// Wind speed / active power scatter
    PowerCurve {
        #[command(flatten)]
        selection: Selection,
    },

    /// List known turbines
    Turbines,

    /// List known parameters
    Parameters,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Load config file
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    // Merge CLI args with config
    let merged = config.merge_with_args(cli.store_root.as_deref(), cli.output, cli.no_color)?;

    // Create output context
    let ctx = OutputContext::new(merged.output, merged.no_color, cli.quiet);

    let engine =
        ArchiveEngine::from_config(&merged.engine).context("Failed to set up archive engine")?;
    let today = chrono::Local::now().date_naive();
    debug!(%today, store = ?merged.engine.store, "Engine ready");

    // Execute command
    match &cli.command {
        Commands::Series {
            selection,
            params,
            aggs,
        } => {
            commands::series(&engine, selection, params, aggs, today, &ctx).await?;
        }

        Commands::Generation { selection } => {
            commands::generation(&engine, selection, today, &ctx).await?;
        }

        Commands::PowerCurve { selection } => {
            commands::power_curve(&engine, selection, today, &ctx).await?;
        }

        Commands::Turbines => commands::turbines(&engine, &ctx),

        Commands::Parameters => commands::parameters(&engine, &ctx),
    }

    Ok(())
}

impl Selection {
    /// Turbine filter, `None` when no `--turbine` was given
    pub fn turbine_ids(&self) -> Option<Vec<windscope_core::TurbineId>> {
        if self.turbines.is_empty() {
            None
        } else {
            Some(self.turbines.iter().map(|t| t.as_str().into()).collect())
        }
    }
}
