//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod config;
mod simulate;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

pub use simulate::{parse_script, ScriptCommand, ScriptError, ScriptStep};

/// Process exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Heartfelt - effect engine for a single-page greeting
#[derive(Parser)]
#[command(name = "heartfelt")]
#[command(about = "Heartfelt - effect engine for a single-page greeting")]
#[command(version)]
pub struct Cli {
    /// Log level (off, error, warn, info, debug, trace) or a full log spec.
    /// RUST_LOG takes precedence when set.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load, validate and print the effective configuration
    Config {
        /// Config file (default: search for heartfelt.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write the default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = crate::config::CONFIG_FILE)]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Run the engine headless and print one JSON snapshot per step
    Simulate {
        /// Config file (default: search for heartfelt.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Simulated duration in seconds
        #[arg(long, default_value = "30")]
        seconds: u64,

        /// Snapshot interval in milliseconds
        #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
        step: u64,

        /// Comma-separated input script, e.g. "0:ready,1500:click=secret_heart,4000:key=space".
        /// Commands: ready, error=CODE, state=NAME, click=CONTROL[#N], key=CHAR|space,
        /// slide=VALUE, scroll=PIXELS
        #[arg(long)]
        script: Option<String>,

        /// Random seed for decorations (overrides page.seed)
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Parse arguments, start logging and run the selected command.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = crate::logging::init_logging(cli.log_level.as_deref()) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    match cli.command {
        Commands::Config { config } => config::run_config(config.as_deref()),
        Commands::Init { output, force } => config::run_init(&output, force),
        Commands::Simulate { config, seconds, step, script, seed } => {
            simulate::run_simulate(config.as_deref(), seconds, step, script.as_deref(), seed)
        }
    }
}
