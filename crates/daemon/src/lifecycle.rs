// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

use std::fs::{File, OpenOptions};
use std::io::Write;

use fs2::FileExt;
use gk_adapters::{HttpFileStore, HttpJobStore, TracedFileStore, TracedJobStore};
use gk_core::{JobSpecificationMapper, ShutdownManager, SystemClock, WalError, WriteAheadLog};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::operation::OperationExecutor;
use crate::watcher::{self, DirectoryWatcher, WatchEvent};

/// Dispatcher with concrete adapter types (wrapped with tracing)
pub type DaemonDispatcher =
    Dispatcher<TracedFileStore<HttpFileStore>, TracedJobStore<HttpJobStore>, SystemClock>;

/// Resources held while the daemon runs
pub struct DaemonState {
    pub config: Config,
    pub shutdown: ShutdownManager,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    // NOTE(lifetime): Dropping the watcher stops event delivery
    #[allow(dead_code)]
    watcher: DirectoryWatcher,
}

/// A started daemon: held resources plus the dispatcher and its event feed
pub struct Daemon {
    pub state: DaemonState,
    pub dispatcher: DaemonDispatcher,
    pub events: mpsc::Receiver<WatchEvent>,
}

impl DaemonState {
    /// Remove the pid file; the lock itself is released on drop
    pub fn shutdown(&self) {
        info!("Shutting down daemon...");
        let lock_path = self.config.lock_path();
        if lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }
        info!("Daemon shutdown complete");
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("WAL error: {0}")]
    Wal(#[from] WalError),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon
pub fn startup(config: &Config) -> Result<Daemon, LifecycleError> {
    match startup_inner(config) {
        Ok(daemon) => Ok(daemon),
        // The pid file belongs to the running daemon
        Err(e @ LifecycleError::LockFailed(_)) => Err(e),
        Err(e) => {
            // Clean up any resources created before failure
            cleanup_on_failure(config);
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
fn startup_inner(config: &Config) -> Result<Daemon, LifecycleError> {
    // 1. Create state directory
    std::fs::create_dir_all(&config.state_dir)?;

    // 2. Acquire lock file FIRST - prevents races. Truncate only once held.
    let mut lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(config.lock_path())?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    // 3. Create directories
    std::fs::create_dir_all(&config.dir)?;
    std::fs::create_dir_all(&config.shadow_dir)?;

    // 4. Open the WAL
    let wal = WriteAheadLog::open(&config.wal_dir(), config.wal_compaction_threshold)?;
    info!(pending = wal.len(), "Loaded WAL");

    // 5. Watch the inbound directory
    let (watcher, events) = watcher::watch(&config.dir, config.watch_channel_capacity)?;

    // 6. Set up adapters (wrapped with tracing for observability)
    let file_store = TracedFileStore::new(HttpFileStore::new(config.file_store_url.clone()));
    let job_store = TracedJobStore::new(HttpJobStore::new(config.job_store_url.clone()));
    let executor = OperationExecutor::new(&config.dir, &config.shadow_dir, file_store, job_store)
        .with_mapper(JobSpecificationMapper::new(config.cc_mail.clone()))
        .with_fallback_charset(config.fallback_charset);

    let shutdown = ShutdownManager::new();
    let dispatcher = Dispatcher::new(config, wal, executor, shutdown.clone(), SystemClock);

    info!(dir = %config.dir.display(), "Daemon started");

    Ok(Daemon {
        state: DaemonState {
            config: config.clone(),
            shutdown,
            lock_file,
            watcher,
        },
        dispatcher,
        events,
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    let lock_path = config.lock_path();
    if lock_path.exists() {
        let _ = std::fs::remove_file(&lock_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
