// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Records stored in the write-ahead log

use crate::modification::Modification;
use serde::{Deserialize, Serialize};

/// One state change of the modification queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WalRecord {
    /// A transfile's modifications, written as one entry
    Append {
        next_id: u64,
        modifications: Vec<Modification>,
    },
    Lock {
        id: u64,
    },
    Unlock {
        id: u64,
    },
    Remove {
        id: u64,
    },
    /// Complete queue contents, replacing everything before it
    Checkpoint {
        next_id: u64,
        modifications: Vec<Modification>,
    },
}
