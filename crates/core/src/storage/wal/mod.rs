// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-Ahead Log (WAL) module
//!
//! This module provides the durable FIFO queue of pending modifications.
//! The WAL file is the source of truth; the queue is derived by replaying it.
//!
//! ## Architecture
//!
//! ```text
//! WalRecord → WalEntry → WalWriter → disk (wal.jsonl)
//!                                         ↓
//!                               WalReader → replay → pending modifications
//! ```
//!
//! ## Durability Guarantees
//!
//! - Every write is followed by `fsync()` before returning
//! - A transfile's modifications are appended as a single entry
//! - Checksums detect corruption from bit flips
//! - Truncated writes (crash during append) are detected on read
//! - Opening truncates the WAL at the last valid entry

pub mod entry;
mod log;
pub mod reader;
pub mod record;
pub mod writer;

pub use entry::WalEntry;
pub use log::{read_pending, WriteAheadLog, LOCK_FILE_NAME, WAL_FILE_NAME};
pub use reader::{WalEntryIter, WalReadError, WalReader};
pub use record::WalRecord;
pub use writer::WalWriter;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WAL read error: {0}")]
    Read(#[from] WalReadError),

    /// The oldest modification was locked by a process that never finished it
    #[error("modification {id} is locked; it may have partially executed")]
    ModificationLocked { id: u64 },

    #[error("modification {id} not found")]
    NotFound { id: u64 },

    #[error("WAL is in use by another process")]
    Locked,

    /// A failed append left bytes that could not be removed
    #[error("WAL writer is poisoned by an unrepaired partial write; reopen the WAL")]
    Poisoned,
}
