// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append side of the WAL file

use super::entry::WalEntry;
use super::record::WalRecord;
use super::WalError;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends records to the WAL file, one JSON line each
///
/// Every append is fsync'd before it returns, so a record the caller has
/// seen succeed survives a crash. A failed append is truncated away so later
/// records never land behind a torn line.
pub struct WalWriter {
    path: PathBuf,
    file: File,
    next_sequence: u64,
    /// Set when a failed append could not be rolled back
    poisoned: bool,
    #[cfg(test)]
    pub(super) fail_after: Option<usize>,
}

impl WalWriter {
    /// Open `path` for appending, numbering new entries from `next_sequence`
    ///
    /// The caller has replayed (and repaired) the file and knows where the
    /// sequence left off.
    pub fn open(path: &Path, next_sequence: u64) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            next_sequence,
            poisoned: false,
            #[cfg(test)]
            fail_after: None,
        })
    }

    /// Durably append `record`, returning its sequence number
    ///
    /// On failure the file is cut back to its length before the call. If
    /// that also fails the writer is poisoned and refuses further appends.
    pub fn append(&mut self, record: WalRecord) -> Result<u64, WalError> {
        if self.poisoned {
            return Err(WalError::Poisoned);
        }

        let sequence = self.next_sequence;
        let mut line = WalEntry::new(sequence, record).to_line()?;
        line.push('\n');

        let start = self.file.metadata()?.len();
        if let Err(e) = self.write_durably(line.as_bytes()) {
            if let Err(rollback) = self.truncate(start) {
                tracing::error!(
                    path = %self.path.display(),
                    error = %rollback,
                    "failed to roll back partial WAL write"
                );
                self.poisoned = true;
            }
            return Err(e.into());
        }

        self.next_sequence += 1;
        Ok(sequence)
    }

    fn write_durably(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        #[cfg(test)]
        if let Some(n) = self.fail_after.take() {
            self.file.write_all(&bytes[..n.min(bytes.len())])?;
            return Err(std::io::Error::other("injected write failure"));
        }
        self.file.write_all(bytes)?;
        self.file.sync_all()
    }

    fn truncate(&mut self, len: u64) -> std::io::Result<()> {
        self.file.set_len(len)?;
        self.file.sync_all()
    }

    /// Sequence number the next append receives
    pub fn sequence(&self) -> u64 {
        self.next_sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
