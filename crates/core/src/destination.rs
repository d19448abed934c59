// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Destinations handled by the gatekeeper instead of the legacy system

use crate::jobspec::JobSpecification;
use serde::{Deserialize, Serialize};

/// A configured destination, keyed by submitter, destination, packaging and format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatekeeperDestination {
    pub submitter: u64,
    pub destination: String,
    pub packaging: String,
    pub format: String,
    /// The legacy system receives a copy of the data
    #[serde(default)]
    pub copy_to_shadow: bool,
    /// When copying, the legacy system sends the notifications
    #[serde(default)]
    pub notify_from_shadow: bool,
}

impl GatekeeperDestination {
    pub fn matches(&self, spec: &JobSpecification) -> bool {
        self.submitter == spec.submitter_id
            && self.destination == spec.destination
            && self.packaging == spec.packaging
            && self.format == spec.format
    }

    pub fn routing(&self) -> Routing {
        if self.copy_to_shadow {
            Routing::Shared {
                notify_from_shadow: self.notify_from_shadow,
            }
        } else {
            Routing::Exclusive
        }
    }
}

/// How a transfile line is routed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    /// No configured destination matches
    Unconfigured,
    /// Configured, handled here only
    Exclusive,
    /// Configured, and copied to the shadow directory for the legacy system
    Shared { notify_from_shadow: bool },
}

/// Resolve the routing of `spec` against `destinations`
pub fn route(destinations: &[GatekeeperDestination], spec: &JobSpecification) -> Routing {
    destinations
        .iter()
        .find(|d| d.matches(spec))
        .map_or(Routing::Unconfigured, GatekeeperDestination::routing)
}
