// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gatekeeper Daemon (gkd)
//!
//! Background process that watches the inbound directory and dispatches
//! transfiles.

use std::path::{Path, PathBuf};

use clap::Parser;
use gk_daemon::config::{CONFIG_ENV, DEFAULT_CONFIG_PATH};
use gk_daemon::lifecycle::{self, Daemon};
use gk_daemon::{Config, DispatchError, LifecycleError};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "gkd", version, about = "Gatekeeper dispatch daemon")]
struct Args {
    /// Path to the config file
    #[arg(long, env = CONFIG_ENV, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = Config::load(&args.config)?;

    // Write startup marker to log (before tracing setup, so operators can find it)
    write_startup_marker(&config.log_path())?;

    // Set up logging
    let log_guard = setup_logging(&config.log_path())?;

    info!("Starting gkd with config: {}", args.config.display());

    // Start daemon
    let Daemon {
        state,
        mut dispatcher,
        mut events,
    } = match lifecycle::startup(&config) {
        Ok(d) => d,
        Err(e) => {
            // Write error synchronously (tracing is non-blocking and may not flush in time)
            write_startup_error(&config.log_path(), &e);
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    // Set up signal handlers
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let restart_delay = config.restart_delay;
    let mut task = tokio::spawn(async move {
        let result = dispatcher.supervise(&mut events, restart_delay).await;
        (dispatcher, result)
    });

    info!("Daemon ready, watching {}", config.dir.display());

    // Signal ready for parent process (e.g., systemd)
    println!("READY");

    let joined = tokio::select! {
        joined = &mut task => joined,
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down...");
            state.shutdown.signal_shutdown_in_progress();
            task.await
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down...");
            state.shutdown.signal_shutdown_in_progress();
            task.await
        }
    };

    let result = match joined {
        Ok((_dispatcher, result)) => result,
        Err(e) => {
            error!("Dispatcher task failed: {}", e);
            state.shutdown();
            return Err(e.into());
        }
    };
    state.shutdown();

    if let Err(e) = result {
        if let DispatchError::Wal(gk_core::WalError::ModificationLocked { id }) = &e {
            error!(
                id,
                "modification {} was left locked by an earlier run; inspect it with `gk wal list`",
                id
            );
        } else {
            error!("Dispatcher stopped: {}", e);
        }
        return Err(e.into());
    }

    info!("Daemon stopped");
    Ok(())
}

/// Startup marker prefix written to log before anything else.
/// Full format: "--- gkd: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- gkd: starting (pid: ";

/// Write startup marker to log file (appends to existing log)
fn write_startup_marker(log_path: &Path) -> Result<(), LifecycleError> {
    use std::io::Write;

    // Create log directory if needed
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Append marker to log file with PID
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write startup error synchronously to log file.
fn write_startup_error(log_path: &Path, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

fn setup_logging(
    log_path: &Path,
) -> Result<tracing_appender::non_blocking::WorkerGuard, std::io::Error> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let (Some(dir), Some(file_name)) = (log_path.parent(), log_path.file_name()) else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid log path: {}", log_path.display()),
        ));
    };
    std::fs::create_dir_all(dir)?;

    // Set up file appender
    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Set up subscriber with env filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
