// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL commands

use crate::output::{self, OutputFormat};
use anyhow::Context;
use clap::{Args, Subcommand};
use gk_core::storage::read_pending;
use gk_core::{Modification, WalError, WriteAheadLog};
use gk_daemon::Config;
use serde::Serialize;
use std::fmt;

#[derive(Args)]
pub struct WalArgs {
    #[command(subcommand)]
    pub command: WalCommand,
}

#[derive(Subcommand)]
pub enum WalCommand {
    /// List pending modifications, oldest first
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Clear the lock left on a modification by an interrupted run
    Unlock {
        /// Modification id
        id: u64,
    },
    /// Drop a modification that was completed by hand
    Remove {
        /// Modification id
        id: u64,
    },
}

#[derive(Serialize)]
struct ModificationInfo {
    id: u64,
    locked: bool,
    opcode: String,
    transfile: String,
    created: String,
    arg: String,
}

impl From<Modification> for ModificationInfo {
    fn from(m: Modification) -> Self {
        Self {
            id: m.id,
            locked: m.locked,
            opcode: m.opcode.to_string(),
            transfile: m.transfile_name,
            created: m.created_at.to_rfc3339(),
            arg: m.arg,
        }
    }
}

impl fmt::Display for ModificationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Transfile contents span lines; show the first
        let arg = self.arg.lines().next().unwrap_or_default();
        write!(
            f,
            "{:<6} {:<6} {:<38} {:<20} {:<25} {}",
            self.id,
            if self.locked { "yes" } else { "no" },
            self.opcode,
            self.transfile,
            self.created,
            arg
        )
    }
}

pub fn handle(command: WalCommand, config: &Config) -> anyhow::Result<()> {
    match command {
        WalCommand::List { json } => list(config, OutputFormat::from_json_flag(json)),
        WalCommand::Unlock { id } => {
            open(config)?.unlock(id)?;
            println!("Unlocked modification {}", id);
            Ok(())
        }
        WalCommand::Remove { id } => {
            open(config)?.remove(id)?;
            println!("Removed modification {}", id);
            Ok(())
        }
    }
}

fn list(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let wal_dir = config.wal_dir();
    let pending: Vec<ModificationInfo> = read_pending(&wal_dir)
        .with_context(|| format!("failed to read WAL in {}", wal_dir.display()))?
        .into_iter()
        .map(ModificationInfo::from)
        .collect();

    if pending.is_empty() && format == OutputFormat::Text {
        println!("No pending modifications");
        return Ok(());
    }
    let header = format!(
        "{:<6} {:<6} {:<38} {:<20} {:<25} ARG",
        "ID", "LOCKED", "OPCODE", "TRANSFILE", "CREATED"
    );
    output::print_list(&pending, &header, format)
}

/// Open the WAL for writing; fails while the daemon holds it
fn open(config: &Config) -> anyhow::Result<WriteAheadLog> {
    match WriteAheadLog::open(&config.wal_dir(), config.wal_compaction_threshold) {
        Err(WalError::Locked) => anyhow::bail!("the WAL is in use; stop gkd first"),
        result => result.context("failed to open WAL"),
    }
}
