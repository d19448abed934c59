// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound directory watch feeding the dispatcher

use notify::event::{AccessKind, AccessMode};
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Wake-up triggers for the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A file in the directory was created or written
    Changed(PathBuf),
    /// Events may have been lost; rescan the whole directory
    Rescan,
}

/// Keeps the underlying watcher alive; dropping it stops event delivery
pub struct DirectoryWatcher {
    _watcher: RecommendedWatcher,
}

/// Watch `dir` non-recursively
///
/// Events are pushed with `try_send` from notify's thread, so a full channel
/// drops them. The dispatcher's periodic scan picks up anything missed.
pub fn watch(
    dir: &Path,
    capacity: usize,
) -> Result<(DirectoryWatcher, mpsc::Receiver<WatchEvent>), notify::Error> {
    let (tx, rx) = mpsc::channel(capacity);
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            let events = match res {
                Ok(event) => translate(event),
                Err(e) => {
                    tracing::warn!(error = %e, "watch error");
                    vec![WatchEvent::Rescan]
                }
            };
            for event in events {
                if tx.try_send(event).is_err() {
                    tracing::trace!("watch channel full or closed, dropping event");
                }
            }
        },
        NotifyConfig::default(),
    )?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    tracing::info!(dir = %dir.display(), "watching directory");

    Ok((DirectoryWatcher { _watcher: watcher }, rx))
}

fn translate(event: Event) -> Vec<WatchEvent> {
    if event.need_rescan() {
        return vec![WatchEvent::Rescan];
    }
    match event.kind {
        EventKind::Create(_)
        | EventKind::Modify(_)
        | EventKind::Access(AccessKind::Close(AccessMode::Write)) => {
            event.paths.into_iter().map(WatchEvent::Changed).collect()
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
