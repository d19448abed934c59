// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! gk-core: dispatch core of the gatekeeper
//!
//! This crate provides:
//! - Transfile parsing and charset detection
//! - Mapping of transfile lines to job specifications
//! - The modification factory deciding what a transfile turns into
//! - A durable write-ahead log of pending modifications
//! - Cooperative shutdown state shared with the dispatcher

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod clock;
pub mod destination;
pub mod encoding;
pub mod finder;
pub mod jobspec;
pub mod modification;
pub mod shutdown;
pub mod storage;
pub mod transfile;

pub use clock::{Clock, FakeClock, SystemClock};
pub use destination::{GatekeeperDestination, Routing};
pub use encoding::Charset;
pub use finder::{find_files_with_extension, has_extension};
pub use jobspec::{JobSpecification, JobSpecificationError, JobSpecificationMapper, JobType};
pub use modification::{Modification, ModificationFactory, Opcode};
pub use shutdown::ShutdownManager;
pub use storage::{WalError, WriteAheadLog};
pub use transfile::{Line, Transfile, TransfileData, TransfileError};
