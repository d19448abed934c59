// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File store over HTTP

use super::{FileStore, FileStoreError};
use crate::http;
use async_trait::async_trait;

/// HTTP file store client
#[derive(Clone)]
pub struct HttpFileStore {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpFileStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent: http::agent(),
        }
    }
}

/// The id is the last path segment of `Location`, else the response body
fn file_id(location: Option<&str>, body: &str) -> Option<String> {
    location
        .and_then(|l| l.trim_end_matches('/').rsplit('/').next())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .or_else(|| Some(body.trim()).filter(|b| !b.is_empty()))
        .map(str::to_string)
}

#[async_trait]
impl FileStore for HttpFileStore {
    async fn add_file(&self, content: Vec<u8>) -> Result<String, FileStoreError> {
        let url = format!("{}/files", self.base_url);
        let response = http::post_bytes(&self.agent, url, content).await?;
        if !response.is_success() {
            return Err(FileStoreError::UnexpectedStatus {
                status: response.status,
                body: response.body,
            });
        }
        file_id(response.location.as_deref(), &response.body).ok_or(FileStoreError::MissingId)
    }

    async fn delete_file(&self, id: &str) -> Result<(), FileStoreError> {
        let url = format!("{}/files/{}", self.base_url, id);
        let response = http::delete(&self.agent, url).await?;
        if !response.is_success() {
            return Err(FileStoreError::UnexpectedStatus {
                status: response.status,
                body: response.body,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
