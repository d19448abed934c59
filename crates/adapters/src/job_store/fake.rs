// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake job store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{AddNotificationRequest, JobInfo, JobInputStream, JobStore, JobStoreError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Recorded job store call
#[derive(Debug, Clone, PartialEq)]
pub enum JobStoreCall {
    AddJob(JobInputStream),
    AddNotification(AddNotificationRequest),
}

#[derive(Default)]
struct FakeState {
    calls: Vec<JobStoreCall>,
    next_job_id: u64,
    job_failure: Option<u16>,
    notification_failure: Option<u16>,
}

/// In-memory job store for testing
#[derive(Clone, Default)]
pub struct FakeJobStore {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<JobStoreCall> {
        self.state().calls.clone()
    }

    /// Jobs accepted or attempted, in call order
    pub fn jobs(&self) -> Vec<JobInputStream> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                JobStoreCall::AddJob(input) => Some(input),
                JobStoreCall::AddNotification(_) => None,
            })
            .collect()
    }

    /// Notifications sent or attempted, in call order
    pub fn notifications(&self) -> Vec<AddNotificationRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                JobStoreCall::AddNotification(request) => Some(request),
                JobStoreCall::AddJob(_) => None,
            })
            .collect()
    }

    /// Make subsequent job creations fail with `status`
    pub fn set_job_failure(&self, status: Option<u16>) {
        self.state().job_failure = status;
    }

    /// Make subsequent notifications fail with `status`
    pub fn set_notification_failure(&self, status: Option<u16>) {
        self.state().notification_failure = status;
    }
}

fn injected(status: u16) -> JobStoreError {
    JobStoreError::UnexpectedStatus {
        status,
        body: "injected failure".to_string(),
    }
}

#[async_trait]
impl JobStore for FakeJobStore {
    async fn add_job(&self, input: &JobInputStream) -> Result<JobInfo, JobStoreError> {
        let mut state = self.state();
        state.calls.push(JobStoreCall::AddJob(input.clone()));
        if let Some(status) = state.job_failure {
            return Err(injected(status));
        }
        state.next_job_id += 1;
        Ok(JobInfo {
            job_id: state.next_job_id,
        })
    }

    async fn add_notification(
        &self,
        request: &AddNotificationRequest,
    ) -> Result<(), JobStoreError> {
        let mut state = self.state();
        state
            .calls
            .push(JobStoreCall::AddNotification(request.clone()));
        match state.notification_failure {
            Some(status) => Err(injected(status)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
