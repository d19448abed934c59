// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cooperative shutdown between the signal handler and the dispatcher

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

#[derive(Debug)]
struct State {
    shutdown_in_progress: bool,
    ready_to_exit: bool,
}

/// Shared shutdown state, cloned into every task that needs it
///
/// The dispatcher brackets each modification with [`signal_busy`] and
/// [`signal_ready_to_exit`]; the signal handler flips
/// [`signal_shutdown_in_progress`] and waits on [`ready_to_exit`].
///
/// [`signal_busy`]: ShutdownManager::signal_busy
/// [`signal_ready_to_exit`]: ShutdownManager::signal_ready_to_exit
/// [`signal_shutdown_in_progress`]: ShutdownManager::signal_shutdown_in_progress
/// [`ready_to_exit`]: ShutdownManager::ready_to_exit
#[derive(Debug, Clone)]
pub struct ShutdownManager {
    state: Arc<Mutex<State>>,
    notify: Arc<Notify>,
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                shutdown_in_progress: false,
                ready_to_exit: true,
            })),
            notify: Arc::new(Notify::new()),
        }
    }

    // A poisoned lock still holds two valid booleans
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn signal_shutdown_in_progress(&self) {
        self.state().shutdown_in_progress = true;
        self.notify.notify_waiters();
    }

    /// Mark the process busy; false when shutdown has already begun
    pub fn signal_busy(&self) -> bool {
        let mut state = self.state();
        if state.shutdown_in_progress {
            return false;
        }
        state.ready_to_exit = false;
        true
    }

    pub fn signal_ready_to_exit(&self) {
        self.state().ready_to_exit = true;
        self.notify.notify_waiters();
    }

    pub fn is_shutdown_in_progress(&self) -> bool {
        self.state().shutdown_in_progress
    }

    pub fn is_ready_to_exit(&self) -> bool {
        self.state().ready_to_exit
    }

    /// Resolves once shutdown has been signalled
    pub async fn shutdown_requested(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_shutdown_in_progress() {
                return;
            }
            notified.await;
        }
    }

    /// Resolves once no modification is in flight
    pub async fn ready_to_exit(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_ready_to_exit() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
#[path = "shutdown_tests.rs"]
mod tests;
