// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the upstream file store and job store

pub mod file_store;
mod http;
pub mod job_store;
pub mod traced;

pub use file_store::{FileStore, FileStoreError, HttpFileStore};
pub use http::TransportError;
pub use job_store::{
    AddNotificationRequest, HttpJobStore, JobInfo, JobInputStream, JobStore, JobStoreError,
    NotificationType,
};
pub use traced::{TracedFileStore, TracedJobStore};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use file_store::{FakeFileStore, FileStoreCall};
#[cfg(any(test, feature = "test-support"))]
pub use job_store::{FakeJobStore, JobStoreCall};
