// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake file store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{FileStore, FileStoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Recorded file store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStoreCall {
    AddFile { content: Vec<u8> },
    DeleteFile { id: String },
}

#[derive(Default)]
struct FakeState {
    files: BTreeMap<String, Vec<u8>>,
    calls: Vec<FileStoreCall>,
    next_id: u64,
    add_failure: Option<u16>,
}

/// In-memory file store for testing
#[derive(Clone, Default)]
pub struct FakeFileStore {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<FileStoreCall> {
        self.state().calls.clone()
    }

    /// Get a stored file by id
    pub fn file(&self, id: &str) -> Option<Vec<u8>> {
        self.state().files.get(id).cloned()
    }

    /// Number of files currently stored
    pub fn len(&self) -> usize {
        self.state().files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().files.is_empty()
    }

    /// Make subsequent uploads fail with `status`, or succeed again with `None`
    pub fn set_add_failure(&self, status: Option<u16>) {
        self.state().add_failure = status;
    }
}

#[async_trait]
impl FileStore for FakeFileStore {
    async fn add_file(&self, content: Vec<u8>) -> Result<String, FileStoreError> {
        let mut state = self.state();
        state.calls.push(FileStoreCall::AddFile {
            content: content.clone(),
        });
        if let Some(status) = state.add_failure {
            return Err(FileStoreError::UnexpectedStatus {
                status,
                body: "injected failure".to_string(),
            });
        }

        state.next_id += 1;
        let id = state.next_id.to_string();
        state.files.insert(id.clone(), content);
        Ok(id)
    }

    async fn delete_file(&self, id: &str) -> Result<(), FileStoreError> {
        let mut state = self.state();
        state
            .calls
            .push(FileStoreCall::DeleteFile { id: id.to_string() });
        state.files.remove(id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
