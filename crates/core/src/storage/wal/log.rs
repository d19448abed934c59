// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The modification queue backed by the WAL file

use super::entry::WalEntry;
use super::reader::WalReader;
use super::record::WalRecord;
use super::writer::WalWriter;
use super::WalError;
use crate::modification::Modification;
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const WAL_FILE_NAME: &str = "wal.jsonl";
pub const LOCK_FILE_NAME: &str = "wal.lock";

/// Queue contents rebuilt from WAL records
#[derive(Debug, Default)]
struct Queue {
    pending: BTreeMap<u64, Modification>,
    next_id: u64,
}

impl Queue {
    fn apply(&mut self, record: WalRecord) {
        match record {
            WalRecord::Append {
                next_id,
                modifications,
            } => {
                for m in modifications {
                    self.pending.insert(m.id, m);
                }
                self.next_id = self.next_id.max(next_id);
            }
            WalRecord::Checkpoint {
                next_id,
                modifications,
            } => {
                self.pending = modifications.into_iter().map(|m| (m.id, m)).collect();
                self.next_id = self.next_id.max(next_id);
            }
            WalRecord::Lock { id } => {
                if let Some(m) = self.pending.get_mut(&id) {
                    m.locked = true;
                }
            }
            WalRecord::Unlock { id } => {
                if let Some(m) = self.pending.get_mut(&id) {
                    m.locked = false;
                }
            }
            WalRecord::Remove { id } => {
                self.pending.remove(&id);
            }
        }
    }
}

/// Result of replaying the WAL file
struct Replay {
    queue: Queue,
    /// Valid entries read
    entries: u64,
    next_sequence: u64,
    /// Position after the last valid entry when a corrupt one followed
    corrupt_at: Option<u64>,
}

fn replay(path: &Path) -> Result<Replay, WalError> {
    let mut replay = Replay {
        queue: Queue {
            next_id: 1,
            ..Queue::default()
        },
        entries: 0,
        next_sequence: 0,
        corrupt_at: None,
    };
    let mut iter = WalReader::open_or_empty(path).entries()?;
    while let Some(result) = iter.next() {
        match result {
            Ok(entry) => {
                replay.next_sequence = entry.sequence + 1;
                replay.queue.apply(entry.record);
                replay.entries += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, "stopping WAL replay at corrupt entry");
                replay.corrupt_at = Some(iter.last_valid_position());
                break;
            }
        }
    }
    Ok(replay)
}

/// Pending modifications in `dir`, read without taking the store lock
///
/// Used for inspection while a daemon holds the store. A torn tail is
/// ignored rather than repaired.
pub fn read_pending(dir: &Path) -> Result<Vec<Modification>, WalError> {
    let replay = replay(&dir.join(WAL_FILE_NAME))?;
    Ok(replay.queue.pending.into_values().collect())
}

/// Durable FIFO queue of modifications
///
/// Holds an exclusive lock on the store directory while open.
pub struct WriteAheadLog {
    dir: PathBuf,
    writer: WalWriter,
    queue: Queue,
    entries: u64,
    compaction_threshold: u64,
    _lock: File,
}

impl WriteAheadLog {
    /// Open the store in `dir`, repairing a torn tail and replaying the queue
    ///
    /// `compaction_threshold` is the number of WAL entries tolerated before
    /// an emptied queue is rewritten as a single checkpoint.
    pub fn open(dir: &Path, compaction_threshold: u64) -> Result<Self, WalError> {
        std::fs::create_dir_all(dir)?;

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(dir.join(LOCK_FILE_NAME))?;
        lock.try_lock_exclusive().map_err(|_| WalError::Locked)?;

        let wal_path = dir.join(WAL_FILE_NAME);
        let Replay {
            queue,
            entries,
            next_sequence,
            corrupt_at,
        } = replay(&wal_path)?;
        if let Some(position) = corrupt_at {
            let file = OpenOptions::new().write(true).open(&wal_path)?;
            file.set_len(position)?;
            file.sync_all()?;
            tracing::info!(position, "WAL truncated at corruption point");
        }

        let writer = WalWriter::open(&wal_path, next_sequence)?;
        tracing::debug!(
            path = %wal_path.display(),
            pending = queue.pending.len(),
            entries,
            "opened WAL"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            writer,
            queue,
            entries,
            compaction_threshold,
            _lock: lock,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&mut self, record: WalRecord) -> Result<(), WalError> {
        self.writer.append(record.clone())?;
        self.entries += 1;
        self.queue.apply(record);
        Ok(())
    }

    /// Persist all `modifications` in one entry, returning their assigned ids
    pub fn append(&mut self, modifications: Vec<Modification>) -> Result<Vec<u64>, WalError> {
        if modifications.is_empty() {
            return Ok(Vec::new());
        }

        let mut next_id = self.queue.next_id;
        let modifications: Vec<Modification> = modifications
            .into_iter()
            .map(|mut m| {
                m.id = next_id;
                m.locked = false;
                next_id += 1;
                m
            })
            .collect();
        let ids = modifications.iter().map(|m| m.id).collect();

        self.write(WalRecord::Append {
            next_id,
            modifications,
        })?;
        Ok(ids)
    }

    /// Lock and return the oldest modification
    ///
    /// Fails with [`WalError::ModificationLocked`] when the oldest entry is
    /// already locked, which only happens after a crash mid-operation.
    pub fn next(&mut self) -> Result<Option<Modification>, WalError> {
        let Some((&id, oldest)) = self.queue.pending.first_key_value() else {
            return Ok(None);
        };
        if oldest.locked {
            return Err(WalError::ModificationLocked { id });
        }

        self.write(WalRecord::Lock { id })?;
        Ok(self.queue.pending.get(&id).cloned())
    }

    /// Delete a modification whose operation completed
    pub fn remove(&mut self, id: u64) -> Result<(), WalError> {
        if !self.queue.pending.contains_key(&id) {
            return Err(WalError::NotFound { id });
        }
        self.write(WalRecord::Remove { id })?;

        if self.queue.pending.is_empty() && self.entries > self.compaction_threshold {
            self.compact()?;
        }
        Ok(())
    }

    /// Release a modification's lock so it is retried
    pub fn unlock(&mut self, id: u64) -> Result<(), WalError> {
        if !self.queue.pending.contains_key(&id) {
            return Err(WalError::NotFound { id });
        }
        self.write(WalRecord::Unlock { id })
    }

    /// Snapshot of pending modifications, oldest first
    pub fn list(&self) -> Vec<Modification> {
        self.queue.pending.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.queue.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.pending.is_empty()
    }

    /// Number of entries in the WAL file
    pub fn entry_count(&self) -> u64 {
        self.entries
    }

    /// Rewrite the WAL as a single checkpoint of the current queue
    pub fn compact(&mut self) -> Result<(), WalError> {
        let wal_path = self.writer.path().to_path_buf();
        let temp_path = wal_path.with_extension("jsonl.compact.tmp");

        let checkpoint = WalRecord::Checkpoint {
            next_id: self.queue.next_id,
            modifications: self.list(),
        };
        // Keep sequence numbers increasing across compaction
        let sequence = self.writer.sequence();
        let entry = WalEntry::new(sequence, checkpoint);
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(format!("{}\n", entry.to_line()?).as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(&temp_path, &wal_path)?;

        let removed = self.entries;
        self.writer = WalWriter::open(&wal_path, sequence + 1)?;
        self.entries = 1;
        tracing::info!(removed, "WAL compacted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
