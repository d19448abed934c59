// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One line of the WAL file

use super::record::WalRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A record stamped with its sequence number, write time and CRC32
///
/// The checksum covers the serialized record only, so a torn or bit-flipped
/// record is caught even when the surrounding JSON still parses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalEntry {
    pub sequence: u64,
    pub written_at: DateTime<Utc>,
    pub record: WalRecord,
    pub checksum: u32,
}

impl WalEntry {
    pub fn new(sequence: u64, record: WalRecord) -> Self {
        Self::written_at(sequence, Utc::now(), record)
    }

    pub fn written_at(sequence: u64, written_at: DateTime<Utc>, record: WalRecord) -> Self {
        let checksum = checksum(&record);
        Self {
            sequence,
            written_at,
            record,
            checksum,
        }
    }

    /// Whether the stored checksum still matches the record
    pub fn verify(&self) -> bool {
        self.checksum == checksum(&self.record)
    }

    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

fn checksum(record: &WalRecord) -> u32 {
    // Records hold only strings, integers, bools and timestamps
    let json = serde_json::to_vec(record).unwrap_or_default();
    crc32fast::hash(&json)
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
