// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::file_store::{FileStore, FileStoreError};
use crate::job_store::{AddNotificationRequest, JobInfo, JobInputStream, JobStore, JobStoreError};
use async_trait::async_trait;
use std::time::Instant;
use tracing::Instrument;

/// Wrapper that adds tracing to any FileStore
#[derive(Clone)]
pub struct TracedFileStore<S> {
    inner: S,
}

impl<S> TracedFileStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: FileStore> FileStore for TracedFileStore<S> {
    async fn add_file(&self, content: Vec<u8>) -> Result<String, FileStoreError> {
        let span = tracing::info_span!("file_store.add", bytes = content.len());
        async {
            let start = Instant::now();
            let result = self.inner.add_file(content).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(id) => tracing::info!(id, elapsed_ms, "file uploaded"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "upload failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn delete_file(&self, id: &str) -> Result<(), FileStoreError> {
        let span = tracing::info_span!("file_store.delete", id);
        async {
            let result = self.inner.delete_file(id).await;
            match &result {
                Ok(()) => tracing::info!("file deleted"),
                Err(e) => tracing::error!(error = %e, "delete failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any JobStore
#[derive(Clone)]
pub struct TracedJobStore<S> {
    inner: S,
}

impl<S> TracedJobStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: JobStore> JobStore for TracedJobStore<S> {
    async fn add_job(&self, input: &JobInputStream) -> Result<JobInfo, JobStoreError> {
        let spec = &input.job_specification;
        let span = tracing::info_span!(
            "job_store.add_job",
            transfile = %spec.ancestry.transfile,
            destination = %spec.destination,
        );
        async {
            tracing::debug!(data_file = %spec.data_file, job_type = %spec.job_type, "creating job");

            let start = Instant::now();
            let result = self.inner.add_job(input).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(info) => tracing::info!(job_id = info.job_id, elapsed_ms, "job created"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "job creation failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn add_notification(
        &self,
        request: &AddNotificationRequest,
    ) -> Result<(), JobStoreError> {
        let span = tracing::info_span!(
            "job_store.add_notification",
            transfile = %request.context.transfile_name,
        );
        async {
            let result = self.inner.add_notification(request).await;
            match &result {
                Ok(()) => tracing::info!(to = %request.destination_email, "notification sent"),
                Err(e) => tracing::error!(error = %e, "notification failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
