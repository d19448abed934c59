// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! gk - Gatekeeper operator CLI

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{check, wal};
use gk_daemon::config::{CONFIG_ENV, DEFAULT_CONFIG_PATH};
use gk_daemon::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gk", version, about = "Gatekeeper - transfile dispatch operator tool")]
struct Cli {
    /// Path to the gatekeeper config file
    #[arg(long, global = true, env = CONFIG_ENV, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and repair the write-ahead log
    Wal(wal::WalArgs),
    /// Show what the dispatcher would do with a transfile
    Check(check::CheckArgs),
}

fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;

    match cli.command {
        Commands::Wal(args) => wal::handle(args.command, &config),
        Commands::Check(args) => check::handle(args, &config),
    }
}

fn setup_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
