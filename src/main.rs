//! assetflow - static site asset pipeline.
//!
//! Compiles stylesheets, transpiles and minifies scripts, copies static
//! assets, and serves the output with live reload while watching sources.

mod asset;
mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod reload;
mod task;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::PipelineConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let command = cli.command();
    if let Commands::Tasks = command {
        cli::prod::list_tasks();
        return Ok(());
    }

    let config = PipelineConfig::load(&cli)?;

    match command {
        Commands::Dev { .. } => cli::dev::run_dev(config),
        Commands::Prod => cli::prod::run_prod(&config),
        Commands::Run { tasks } => cli::prod::run_tasks(&config, &tasks),
        Commands::Tasks => Ok(()),
    }
}
