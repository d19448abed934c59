// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job store over HTTP

use super::{AddNotificationRequest, JobInfo, JobInputStream, JobStore, JobStoreError};
use crate::http::{self, HttpResponse};
use async_trait::async_trait;

/// HTTP job store client
#[derive(Clone)]
pub struct HttpJobStore {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpJobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent: http::agent(),
        }
    }

    async fn post(&self, path: &str, body: String) -> Result<HttpResponse, JobStoreError> {
        let url = format!("{}{}", self.base_url, path);
        let response = http::post_json(&self.agent, url, body).await?;
        if !response.is_success() {
            return Err(JobStoreError::UnexpectedStatus {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl JobStore for HttpJobStore {
    async fn add_job(&self, input: &JobInputStream) -> Result<JobInfo, JobStoreError> {
        let response = self.post("/jobs", serde_json::to_string(input)?).await?;
        serde_json::from_str(&response.body).map_err(JobStoreError::Decode)
    }

    async fn add_notification(
        &self,
        request: &AddNotificationRequest,
    ) -> Result<(), JobStoreError> {
        self.post("/notifications", serde_json::to_string(request)?).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
