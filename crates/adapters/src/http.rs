// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Blocking HTTP plumbing shared by the store clients
//!
//! ureq is synchronous, so every request runs on tokio's blocking pool.

use std::time::Duration;
use thiserror::Error;

/// Upper bound on a single request, upload included
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// A request that never produced a usable response
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: ureq::Error,
    },
    #[error("failed to read response from {url}")]
    ReadBody {
        url: String,
        #[source]
        source: ureq::Error,
    },
    #[error("HTTP task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub(crate) struct HttpResponse {
    pub status: u16,
    pub location: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

enum Request {
    PostBytes(Vec<u8>),
    PostJson(String),
    Delete,
}

/// Agent that reports non-2xx statuses as responses rather than errors
pub(crate) fn agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(REQUEST_TIMEOUT))
        .build();
    ureq::Agent::new_with_config(config)
}

pub(crate) async fn post_bytes(
    agent: &ureq::Agent,
    url: String,
    body: Vec<u8>,
) -> Result<HttpResponse, TransportError> {
    execute(agent, url, Request::PostBytes(body)).await
}

pub(crate) async fn post_json(
    agent: &ureq::Agent,
    url: String,
    body: String,
) -> Result<HttpResponse, TransportError> {
    execute(agent, url, Request::PostJson(body)).await
}

pub(crate) async fn delete(agent: &ureq::Agent, url: String) -> Result<HttpResponse, TransportError> {
    execute(agent, url, Request::Delete).await
}

async fn execute(
    agent: &ureq::Agent,
    url: String,
    request: Request,
) -> Result<HttpResponse, TransportError> {
    let agent = agent.clone();
    tokio::task::spawn_blocking(move || {
        let result = match request {
            Request::PostBytes(body) => agent
                .post(&url)
                .header("Content-Type", "application/octet-stream")
                .send(body),
            Request::PostJson(body) => agent
                .post(&url)
                .header("Content-Type", "application/json")
                .send(body),
            Request::Delete => agent.delete(&url).call(),
        };
        let mut response = match result {
            Ok(response) => response,
            Err(source) => return Err(TransportError::Request { url, source }),
        };

        let status = response.status().as_u16();
        let location = response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = match response.body_mut().read_to_string() {
            Ok(body) => body,
            Err(source) => return Err(TransportError::ReadBody { url, source }),
        };

        Ok(HttpResponse {
            status,
            location,
            body,
        })
    })
    .await?
}
