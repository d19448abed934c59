// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gk-daemon: configuration, lifecycle and the job dispatcher behind `gkd`

pub mod config;
pub mod dispatcher;
pub mod lifecycle;
pub mod operation;
pub mod watcher;

pub use config::{Config, ConfigError};
pub use dispatcher::{DispatchError, Dispatcher};
pub use lifecycle::{Daemon, DaemonDispatcher, DaemonState, LifecycleError};
pub use operation::{OperationError, OperationExecutor};
pub use watcher::{DirectoryWatcher, WatchEvent};
