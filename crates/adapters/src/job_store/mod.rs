// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job store adapters: job creation and operator notifications

mod http;

pub use http::HttpJobStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeJobStore, JobStoreCall};

use crate::http::TransportError;
use async_trait::async_trait;
use gk_core::JobSpecification;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from job store operations
#[derive(Debug, Error)]
pub enum JobStoreError {
    #[error("job store returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("job store transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl JobStoreError {
    /// True when the store answered with a 5xx status
    pub fn is_server_error(&self) -> bool {
        matches!(self, JobStoreError::UnexpectedStatus { status, .. } if (500..600).contains(status))
    }
}

/// Request body for job creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInputStream {
    pub job_specification: JobSpecification,
    pub is_end_of_job: bool,
    pub part_number: u32,
}

impl JobInputStream {
    /// A single-part job
    pub fn new(job_specification: JobSpecification) -> Self {
        Self {
            job_specification,
            is_end_of_job: true,
            part_number: 0,
        }
    }
}

/// Job store reply to job creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfo {
    pub job_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    InvalidTransfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidTransfileContext {
    pub transfile_name: String,
    pub cause: String,
    pub transfile_content: String,
}

/// Request body for an operator notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddNotificationRequest {
    pub destination_email: String,
    pub notification_type: NotificationType,
    pub context: InvalidTransfileContext,
}

impl AddNotificationRequest {
    pub fn invalid_transfile(
        destination_email: impl Into<String>,
        transfile_name: impl Into<String>,
        cause: impl Into<String>,
        transfile_content: impl Into<String>,
    ) -> Self {
        Self {
            destination_email: destination_email.into(),
            notification_type: NotificationType::InvalidTransfile,
            context: InvalidTransfileContext {
                transfile_name: transfile_name.into(),
                cause: cause.into(),
                transfile_content: transfile_content.into(),
            },
        }
    }
}

/// Adapter for the external job store
#[async_trait]
pub trait JobStore: Clone + Send + Sync + 'static {
    /// Create a job
    async fn add_job(&self, input: &JobInputStream) -> Result<JobInfo, JobStoreError>;

    /// Send an operator notification
    async fn add_notification(&self, request: &AddNotificationRequest)
        -> Result<(), JobStoreError>;
}

#[cfg(test)]
#[path = "job_store_tests.rs"]
mod tests;
