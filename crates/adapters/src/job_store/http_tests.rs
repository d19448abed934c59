// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::http::test_server::serve_once;
use gk_core::{JobSpecificationMapper, Line};

fn input() -> JobInputStream {
    let line = Line::parse("b=danbib,f=123456.data,m=ops@example.org");
    let spec = JobSpecificationMapper::default()
        .map(&line, "123456.trans", "42", b"b=danbib,f=123456.data\nslut\n")
        .unwrap();
    JobInputStream::new(spec)
}

#[tokio::test]
async fn add_job_posts_json_and_reads_job_id() {
    let (url, server) = serve_once("201 Created", &[], r#"{"jobId":11}"#);
    let store = HttpJobStore::new(url);

    let info = store.add_job(&input()).await.unwrap();

    assert_eq!(info.job_id, 11);
    let request = server.join().unwrap();
    assert!(request.starts_with("POST /jobs HTTP/1.1"));
    assert!(request.to_lowercase().contains("content-type: application/json"));
    assert!(request.contains(r#""isEndOfJob":true"#));
    assert!(request.contains(r#""partNumber":0"#));
    assert!(request.contains(r#""dataFile":"urn:dataio-fs:42""#));
}

#[tokio::test]
async fn add_job_reports_status() {
    let (url, server) = serve_once("409 Conflict", &[], "duplicate");
    let store = HttpJobStore::new(url);

    let err = store.add_job(&input()).await.unwrap_err();

    assert!(matches!(err, JobStoreError::UnexpectedStatus { status: 409, .. }));
    assert!(!err.is_server_error());
    server.join().unwrap();
}

#[tokio::test]
async fn add_job_rejects_unreadable_reply() {
    let (url, server) = serve_once("200 OK", &[], "not json");
    let store = HttpJobStore::new(url);

    assert!(matches!(
        store.add_job(&input()).await,
        Err(JobStoreError::Decode(_))
    ));
    server.join().unwrap();
}

#[tokio::test]
async fn add_notification_posts_to_notifications() {
    let (url, server) = serve_once("200 OK", &[], "");
    let store = HttpJobStore::new(format!("{}/", url));
    let request =
        AddNotificationRequest::invalid_transfile("missing", "123456.trans", "bad", "b=x");

    store.add_notification(&request).await.unwrap();

    let raw = server.join().unwrap();
    assert!(raw.starts_with("POST /notifications HTTP/1.1"));
    assert!(raw.contains(r#""notificationType":"INVALID_TRANSFILE""#));
}
