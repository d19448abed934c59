// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Modifications: durable units of work derived from a transfile

mod factory;

pub use factory::ModificationFactory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Opcode {
    /// Upload the datafile and submit a job; arg is the raw transfile line
    CreateJob,
    /// Delete a file from the inbound directory; arg is the file name
    DeleteFile,
    /// Move a file to the shadow directory; arg is the file name
    MoveFile,
    /// Write the transfile into the shadow directory; arg is the content
    CreateTransfile,
    /// Tell the submitter their transfile was rejected; arg is the cause
    CreateInvalidTransfileNotification,
}

impl Opcode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Opcode::CreateJob => "CREATE_JOB",
            Opcode::DeleteFile => "DELETE_FILE",
            Opcode::MoveFile => "MOVE_FILE",
            Opcode::CreateTransfile => "CREATE_TRANSFILE",
            Opcode::CreateInvalidTransfileNotification => "CREATE_INVALID_TRANSFILE_NOTIFICATION",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single operation queued in the write-ahead log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modification {
    /// Assigned by the log on append; zero until then
    pub id: u64,
    pub transfile_name: String,
    pub opcode: Opcode,
    pub arg: String,
    #[serde(default)]
    pub locked: bool,
    pub created_at: DateTime<Utc>,
}

impl Modification {
    pub fn new(transfile_name: impl Into<String>, opcode: Opcode, arg: impl Into<String>) -> Self {
        Self {
            id: 0,
            transfile_name: transfile_name.into(),
            opcode,
            arg: arg.into(),
            locked: false,
            created_at: Utc::now(),
        }
    }
}

impl fmt::Display for Modification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} {}", self.id, self.opcode, self.transfile_name)
    }
}
