// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dry run of the modification factory

use crate::output::{self, OutputFormat};
use anyhow::Context;
use clap::Args;
use gk_core::{ModificationFactory, Transfile};
use gk_daemon::Config;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Args)]
pub struct CheckArgs {
    /// Transfile to check
    pub transfile: PathBuf,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct PlannedModification {
    opcode: String,
    arg: String,
}

#[derive(Serialize)]
struct CheckReport {
    transfile: String,
    charset: String,
    complete: bool,
    cause: Option<String>,
    modifications: Vec<PlannedModification>,
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Transfile: {}", self.transfile)?;
        writeln!(f, "Charset: {}", self.charset)?;
        writeln!(f, "Complete: {}", if self.complete { "yes" } else { "no" })?;
        if let Some(cause) = &self.cause {
            writeln!(f, "Invalid: {}", cause)?;
        }
        if self.modifications.is_empty() {
            return write!(f, "Nothing to dispatch");
        }
        write!(f, "Modifications:")?;
        for m in &self.modifications {
            let mut lines = m.arg.lines();
            write!(f, "\n  {:<38} {}", m.opcode, lines.next().unwrap_or_default())?;
            for line in lines {
                write!(f, "\n  {:<38} {}", "", line)?;
            }
        }
        Ok(())
    }
}

pub fn handle(args: CheckArgs, config: &Config) -> anyhow::Result<()> {
    let transfile = Transfile::open(&args.transfile, config.fallback_charset)
        .with_context(|| format!("failed to read {}", args.transfile.display()))?;

    // Incomplete transfiles are checked as if stalled
    let factory = ModificationFactory::new(config.destinations.clone())
        .with_retain_invalid_transfiles(config.retain_invalid_transfiles);
    let modifications = factory
        .decide(&transfile)
        .into_iter()
        .map(|m| PlannedModification {
            opcode: m.opcode.to_string(),
            arg: m.arg,
        })
        .collect();

    let report = CheckReport {
        transfile: transfile.name().to_string(),
        charset: transfile.charset().to_string(),
        complete: transfile.is_complete(),
        cause: transfile.cause().map(str::to_string),
        modifications,
    };
    output::print(&report, OutputFormat::from_json_flag(args.json))
}
