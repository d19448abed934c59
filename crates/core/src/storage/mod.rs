// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable storage for pending modifications

pub mod wal;

pub use wal::{read_pending, WalError, WriteAheadLog};
