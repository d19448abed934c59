// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Derives the ordered modifications for one transfile

use super::{Modification, Opcode};
use crate::destination::{self, GatekeeperDestination, Routing};
use crate::jobspec::{JobSpecificationError, JobSpecificationMapper, INTERNAL_ADDRESS, MISSING_FIELD};
use crate::transfile::{
    Line, Transfile, EMPTY_CONTENT_CAUSE, END_MARKER, MISSING_DATAFILE_CAUSE,
    MISSING_END_MARKER_CAUSE,
};

/// Turns a transfile into the modifications that dispatch it
///
/// The transfile is deleted last, once every job and datafile it names has
/// been scheduled.
#[derive(Debug, Clone, Default)]
pub struct ModificationFactory {
    destinations: Vec<GatekeeperDestination>,
    mapper: JobSpecificationMapper,
    retain_invalid_transfiles: bool,
}

impl ModificationFactory {
    pub fn new(destinations: Vec<GatekeeperDestination>) -> Self {
        Self {
            destinations,
            ..Self::default()
        }
    }

    /// Copy rejected transfiles to the shadow directory before deleting them
    pub fn with_retain_invalid_transfiles(mut self, retain: bool) -> Self {
        self.retain_invalid_transfiles = retain;
        self
    }

    /// Modifications for `transfile`, in execution order
    ///
    /// Incomplete transfiles are only passed here once stalled. A transfile
    /// holding nothing but the end marker yields no modifications.
    pub fn decide(&self, transfile: &Transfile) -> Vec<Modification> {
        if !transfile.has_content() {
            return self.reject(transfile, EMPTY_CONTENT_CAUSE);
        }
        if !transfile.is_complete() {
            return self.reject(transfile, MISSING_END_MARKER_CAUSE);
        }
        if let Some(cause) = transfile.cause() {
            return self.reject(transfile, cause);
        }
        if transfile.lines().is_empty() {
            return Vec::new();
        }

        let mut routed = Vec::with_capacity(transfile.lines().len());
        for line in transfile.lines() {
            let routing = match self.route(line, transfile.name()) {
                Ok(routing) => routing,
                Err(e) => return self.reject(transfile, &e.to_string()),
            };
            if routing != Routing::Exclusive && line.non_blank("f").is_none() {
                return self.reject(transfile, MISSING_DATAFILE_CAUSE);
            }
            routed.push((line, routing));
        }

        let name = transfile.name();
        let mut modifications = Vec::new();
        let mut forwarded = Vec::new();
        for (line, routing) in routed {
            let datafile = line.non_blank("f");
            match routing {
                Routing::Unconfigured | Routing::Exclusive => {
                    modifications.push(Modification::new(name, Opcode::CreateJob, line.raw()));
                    if let Some(f) = datafile {
                        modifications.push(Modification::new(name, Opcode::DeleteFile, f));
                    }
                }
                Routing::Shared {
                    notify_from_shadow: false,
                } => {
                    modifications.push(Modification::new(name, Opcode::CreateJob, line.raw()));
                    if let Some(f) = datafile {
                        modifications.push(Modification::new(name, Opcode::MoveFile, f));
                    }
                    let mut copy = line.clone();
                    copy.set_field("m", INTERNAL_ADDRESS);
                    copy.set_field("M", INTERNAL_ADDRESS);
                    forwarded.push(copy.as_line());
                }
                Routing::Shared {
                    notify_from_shadow: true,
                } => {
                    let mut job = line.clone();
                    job.set_field("m", "");
                    job.set_field("M", "");
                    modifications.push(Modification::new(name, Opcode::CreateJob, job.as_line()));
                    if let Some(f) = datafile {
                        modifications.push(Modification::new(name, Opcode::MoveFile, f));
                    }
                    forwarded.push(line.as_line());
                }
            }
        }

        if !forwarded.is_empty() {
            forwarded.push(END_MARKER.to_string());
            modifications.push(Modification::new(
                name,
                Opcode::CreateTransfile,
                forwarded.join("\n"),
            ));
        }
        modifications.push(Modification::new(name, Opcode::DeleteFile, name));
        modifications
    }

    fn route(&self, line: &Line, transfile_name: &str) -> Result<Routing, JobSpecificationError> {
        let spec = self.mapper.map(line, transfile_name, MISSING_FIELD, &[])?;
        Ok(destination::route(&self.destinations, &spec))
    }

    fn reject(&self, transfile: &Transfile, cause: &str) -> Vec<Modification> {
        let name = transfile.name();
        tracing::info!(transfile = name, cause, "rejecting transfile");

        let mut modifications = vec![Modification::new(
            name,
            Opcode::CreateInvalidTransfileNotification,
            cause,
        )];
        if self.retain_invalid_transfiles {
            modifications.push(Modification::new(
                name,
                Opcode::CreateTransfile,
                transfile.content(),
            ));
        }
        modifications.push(Modification::new(name, Opcode::DeleteFile, name));
        modifications
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
