// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job dispatcher: turns transfiles into queued modifications and drains
//! the queue one modification at a time
//!
//! Each run starts by draining whatever a previous run left in the WAL, then
//! scans the inbound directory, then waits for watch events and the periodic
//! scan tick.

use crate::config::Config;
use crate::operation::{OperationError, OperationExecutor};
use crate::watcher::WatchEvent;
use gk_adapters::{FileStore, JobStore};
use gk_core::{
    find_files_with_extension, has_extension, Charset, Clock, Modification, ModificationFactory,
    Opcode, ShutdownManager, Transfile, WalError, WriteAheadLog,
};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("WAL error: {0}")]
    Wal(#[from] WalError),

    #[error("modification {id} ({opcode}) failed: {source}")]
    Operation {
        id: u64,
        opcode: Opcode,
        #[source]
        source: OperationError,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("watch channel closed")]
    Watch,

    #[error("interrupted by shutdown")]
    Interrupted,
}

impl DispatchError {
    /// Errors a restart cannot resolve
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DispatchError::Wal(WalError::ModificationLocked { .. } | WalError::Poisoned)
                | DispatchError::Watch
        )
    }
}

pub struct Dispatcher<F, J, C> {
    dir: PathBuf,
    extensions: Vec<String>,
    fallback_charset: Charset,
    stalled_threshold: Duration,
    scan_interval: Duration,
    factory: ModificationFactory,
    wal: WriteAheadLog,
    executor: OperationExecutor<F, J>,
    shutdown: ShutdownManager,
    clock: C,
}

impl<F: FileStore, J: JobStore, C: Clock> Dispatcher<F, J, C> {
    pub fn new(
        config: &Config,
        wal: WriteAheadLog,
        executor: OperationExecutor<F, J>,
        shutdown: ShutdownManager,
        clock: C,
    ) -> Self {
        let factory = ModificationFactory::new(config.destinations.clone())
            .with_retain_invalid_transfiles(config.retain_invalid_transfiles);
        Self {
            dir: config.dir.clone(),
            extensions: config.transfile_extensions.clone(),
            fallback_charset: config.fallback_charset,
            stalled_threshold: config.stalled_threshold,
            scan_interval: config.scan_interval,
            factory,
            wal,
            executor,
            shutdown,
            clock,
        }
    }

    pub fn wal(&self) -> &WriteAheadLog {
        &self.wal
    }

    /// Recover, scan, then dispatch on watch events until shutdown
    pub async fn run(&mut self, events: &mut mpsc::Receiver<WatchEvent>) -> Result<(), DispatchError> {
        self.recover().await?;
        self.scan().await?;

        let shutdown = self.shutdown.clone();
        let mut ticker = tokio::time::interval(self.scan_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.shutdown_requested() => {
                    tracing::info!("dispatcher stopping");
                    return Ok(());
                }
                event = events.recv() => match event {
                    Some(WatchEvent::Changed(path)) => self.on_changed(&path).await?,
                    Some(WatchEvent::Rescan) => self.scan().await?,
                    None => return Err(DispatchError::Watch),
                },
                _ = ticker.tick() => self.scan().await?,
            }
        }
    }

    /// Run, restarting after `restart_delay` on recoverable failures
    ///
    /// Returns `Ok` on shutdown and the error of a fatal failure.
    pub async fn supervise(
        &mut self,
        events: &mut mpsc::Receiver<WatchEvent>,
        restart_delay: Duration,
    ) -> Result<(), DispatchError> {
        let shutdown = self.shutdown.clone();
        loop {
            match self.run(events).await {
                Ok(()) | Err(DispatchError::Interrupted) => return Ok(()),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::error!(error = %e, ?restart_delay, "dispatcher failed, restarting");
                    tokio::select! {
                        _ = tokio::time::sleep(restart_delay) => {}
                        _ = shutdown.shutdown_requested() => return Ok(()),
                    }
                }
            }
        }
    }

    /// Execute everything left in the WAL
    pub async fn recover(&mut self) -> Result<(), DispatchError> {
        if !self.wal.is_empty() {
            tracing::info!(pending = self.wal.len(), "recovering pending modifications");
        }
        self.drain().await
    }

    /// Dispatch every complete or stalled transfile in the inbound directory
    pub async fn scan(&mut self) -> Result<(), DispatchError> {
        let files = find_files_with_extension(&self.dir, self.extensions.as_slice())?;
        tracing::trace!(count = files.len(), "scanned inbound directory");
        for path in files.iter() {
            self.process(path).await?;
        }
        Ok(())
    }

    async fn on_changed(&mut self, path: &Path) -> Result<(), DispatchError> {
        let is_transfile = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| has_extension(n, self.extensions.as_slice()));
        if !is_transfile {
            tracing::trace!(path = %path.display(), "ignoring change");
            return Ok(());
        }
        self.process(path).await
    }

    async fn process(&mut self, path: &Path) -> Result<(), DispatchError> {
        let transfile = match Transfile::open(path, self.fallback_charset) {
            Ok(transfile) => transfile,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "transfile vanished");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let name = transfile.name();

        if !transfile.is_complete() {
            if !transfile.is_stalled(self.clock.now(), self.stalled_threshold) {
                tracing::debug!(transfile = name, "transfile incomplete, waiting");
                return Ok(());
            }
            tracing::warn!(transfile = name, "transfile stalled without end marker");
        }

        let modifications = self.factory.decide(&transfile);
        if modifications.is_empty() {
            tracing::debug!(transfile = name, "nothing to dispatch");
            return Ok(());
        }

        let count = modifications.len();
        self.wal.append(modifications)?;
        tracing::info!(transfile = name, count, "appended modifications");
        self.drain().await
    }

    async fn drain(&mut self) -> Result<(), DispatchError> {
        while let Some(modification) = self.wal.next()? {
            self.dispatch(modification).await?;
        }
        Ok(())
    }

    async fn dispatch(&mut self, modification: Modification) -> Result<(), DispatchError> {
        if !self.shutdown.signal_busy() {
            self.wal.unlock(modification.id)?;
            return Err(DispatchError::Interrupted);
        }
        let result = self.execute(modification).await;
        self.shutdown.signal_ready_to_exit();
        result
    }

    async fn execute(&mut self, modification: Modification) -> Result<(), DispatchError> {
        match self.executor.execute(&modification).await {
            Ok(()) => {
                self.wal.remove(modification.id)?;
                Ok(())
            }
            Err(source) => {
                tracing::error!(
                    id = modification.id,
                    opcode = %modification.opcode,
                    transfile = %modification.transfile_name,
                    error = %source,
                    "operation failed"
                );
                self.wal.unlock(modification.id)?;
                Err(DispatchError::Operation {
                    id: modification.id,
                    opcode: modification.opcode,
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
