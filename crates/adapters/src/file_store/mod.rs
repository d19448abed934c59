// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File store adapters: where datafiles are uploaded before a job is created

mod http;

pub use http::HttpFileStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeFileStore, FileStoreCall};

use crate::http::TransportError;
use async_trait::async_trait;
use thiserror::Error;

/// Errors from file store operations
#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("file store returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("file store transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("file store response carried no file id")]
    MissingId,
}

/// Adapter for the external file store
#[async_trait]
pub trait FileStore: Clone + Send + Sync + 'static {
    /// Upload `content`, returning the store's id for it
    async fn add_file(&self, content: Vec<u8>) -> Result<String, FileStoreError>;

    /// Delete a previously uploaded file
    async fn delete_file(&self, id: &str) -> Result<(), FileStoreError>;
}
