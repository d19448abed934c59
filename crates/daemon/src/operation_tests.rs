// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use gk_adapters::{FakeFileStore, FakeJobStore, FileStoreCall};
use tempfile::TempDir;

struct Harness {
    _tmp: TempDir,
    dir: PathBuf,
    shadow: PathBuf,
    files: FakeFileStore,
    jobs: FakeJobStore,
    executor: OperationExecutor<FakeFileStore, FakeJobStore>,
}

fn harness() -> Harness {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("in");
    let shadow = tmp.path().join("shadow");
    std::fs::create_dir_all(&dir).unwrap();
    let files = FakeFileStore::new();
    let jobs = FakeJobStore::new();
    let executor = OperationExecutor::new(&dir, &shadow, files.clone(), jobs.clone());
    Harness {
        _tmp: tmp,
        dir,
        shadow,
        files,
        jobs,
        executor,
    }
}

fn modification(opcode: Opcode, arg: &str) -> Modification {
    Modification::new("123456.trans", opcode, arg)
}

#[tokio::test]
async fn delete_file_is_idempotent() {
    let h = harness();
    std::fs::write(h.dir.join("123456.data"), "x").unwrap();
    let delete = modification(Opcode::DeleteFile, "123456.data");

    h.executor.execute(&delete).await.unwrap();
    assert!(!h.dir.join("123456.data").exists());

    h.executor.execute(&delete).await.unwrap();
}

#[tokio::test]
async fn move_file_lands_in_shadow_dir() {
    let h = harness();
    std::fs::write(h.dir.join("123456.data"), "records").unwrap();

    h.executor
        .execute(&modification(Opcode::MoveFile, "123456.data"))
        .await
        .unwrap();

    assert!(!h.dir.join("123456.data").exists());
    assert_eq!(
        std::fs::read_to_string(h.shadow.join("123456.data")).unwrap(),
        "records"
    );
}

#[tokio::test]
async fn move_of_missing_file_counts_as_done() {
    let h = harness();
    h.executor
        .execute(&modification(Opcode::MoveFile, "123456.data"))
        .await
        .unwrap();
    assert!(!h.shadow.join("123456.data").exists());
}

#[tokio::test]
async fn create_transfile_writes_content() {
    let h = harness();

    h.executor
        .execute(&modification(Opcode::CreateTransfile, "b=danbib\nslut"))
        .await
        .unwrap();

    assert_eq!(
        std::fs::read_to_string(h.shadow.join("123456.trans")).unwrap(),
        "b=danbib\nslut"
    );
    let entries = std::fs::read_dir(&h.shadow).unwrap().count();
    assert_eq!(entries, 1);
}

#[tokio::test]
async fn create_job_uploads_datafile() {
    let h = harness();
    std::fs::write(h.dir.join("123456.trans"), "b=danbib,f=123456.data\nslut\n").unwrap();
    std::fs::write(h.dir.join("123456.data"), "records").unwrap();

    h.executor
        .execute(&modification(Opcode::CreateJob, "b=danbib,f=123456.data"))
        .await
        .unwrap();

    assert_eq!(h.files.file("1"), Some(b"records".to_vec()));
    let jobs = h.jobs.jobs();
    assert_eq!(jobs.len(), 1);
    let spec = &jobs[0].job_specification;
    assert_eq!(spec.data_file, "urn:dataio-fs:1");
    assert_eq!(spec.submitter_id, 123456);
    assert_eq!(spec.ancestry.details, b"b=danbib,f=123456.data\nslut\n".to_vec());
    assert!(jobs[0].is_end_of_job);
}

#[tokio::test]
async fn create_job_without_datafile_uploads_nothing() {
    let h = harness();
    std::fs::write(h.dir.join("123456.trans"), "b=danbib,f=123456.data\nslut\n").unwrap();

    h.executor
        .execute(&modification(Opcode::CreateJob, "b=danbib,f=123456.data"))
        .await
        .unwrap();
    h.executor
        .execute(&modification(Opcode::CreateJob, "b=danbib"))
        .await
        .unwrap();

    assert!(h.files.calls().is_empty());
    for job in h.jobs.jobs() {
        assert_eq!(job.job_specification.data_file, MISSING_FIELD);
    }
}

#[tokio::test]
async fn create_job_needs_transfile() {
    let h = harness();

    let err = h
        .executor
        .execute(&modification(Opcode::CreateJob, "b=danbib"))
        .await
        .unwrap_err();

    assert!(matches!(err, OperationError::Io { .. }));
    assert!(h.jobs.calls().is_empty());
}

#[tokio::test]
async fn datafile_naming_a_directory_is_an_error() {
    let h = harness();
    std::fs::write(h.dir.join("123456.trans"), "b=danbib,f=123456.d\nslut\n").unwrap();
    std::fs::create_dir(h.dir.join("123456.d")).unwrap();

    let err = h
        .executor
        .execute(&modification(Opcode::CreateJob, "b=danbib,f=123456.d"))
        .await
        .unwrap_err();

    assert!(matches!(err, OperationError::Io { .. }));
}

#[tokio::test]
async fn rejected_job_discards_upload() {
    let h = harness();
    std::fs::write(h.dir.join("123456.trans"), "b=danbib,f=123456.data\nslut\n").unwrap();
    std::fs::write(h.dir.join("123456.data"), "records").unwrap();
    h.jobs.set_job_failure(Some(400));

    let err = h
        .executor
        .execute(&modification(Opcode::CreateJob, "b=danbib,f=123456.data"))
        .await
        .unwrap_err();

    assert!(matches!(err, OperationError::JobStore(_)));
    assert!(h.files.is_empty());
    assert_eq!(
        h.files.calls().last(),
        Some(&FileStoreCall::DeleteFile { id: "1".into() })
    );
}

#[tokio::test]
async fn server_error_keeps_upload() {
    let h = harness();
    std::fs::write(h.dir.join("123456.trans"), "b=danbib,f=123456.data\nslut\n").unwrap();
    std::fs::write(h.dir.join("123456.data"), "records").unwrap();
    h.jobs.set_job_failure(Some(502));

    assert!(h
        .executor
        .execute(&modification(Opcode::CreateJob, "b=danbib,f=123456.data"))
        .await
        .is_err());
    assert_eq!(h.files.len(), 1);
}

#[tokio::test]
async fn invalid_job_type_discards_upload() {
    let h = harness();
    std::fs::write(h.dir.join("123456.trans"), "x\nslut\n").unwrap();
    std::fs::write(h.dir.join("123456.data"), "records").unwrap();

    let err = h
        .executor
        .execute(&modification(Opcode::CreateJob, "b=danbib,f=123456.data,j=bogus"))
        .await
        .unwrap_err();

    assert!(matches!(err, OperationError::JobSpecification(_)));
    assert!(h.files.is_empty());
    assert!(h.jobs.calls().is_empty());
}

#[test]
fn notification_address_prefers_primary_mail() {
    let lines = |text: &[&str]| text.iter().map(|l| Line::parse(l)).collect::<Vec<_>>();

    assert_eq!(
        notification_address(&lines(&["b=x,M=second@x.dk", "b=x,m=first@x.dk"])),
        "first@x.dk"
    );
    assert_eq!(
        notification_address(&lines(&["b=x,m= ", "b=x,M=second@x.dk"])),
        "second@x.dk"
    );
    assert_eq!(notification_address(&lines(&["b=x"])), MISSING_FIELD);
}

#[tokio::test]
async fn notification_carries_transfile_content() {
    let h = harness();
    std::fs::write(h.dir.join("123456.trans"), "b=danbib,m=user@lib.dk\n").unwrap();

    h.executor
        .execute(&modification(
            Opcode::CreateInvalidTransfileNotification,
            "Transfil mangler slut-linje",
        ))
        .await
        .unwrap();

    let sent = h.jobs.notifications();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].destination_email, "user@lib.dk");
    assert_eq!(sent[0].context.transfile_name, "123456.trans");
    assert_eq!(sent[0].context.cause, "Transfil mangler slut-linje");
    assert_eq!(sent[0].context.transfile_content, "b=danbib,m=user@lib.dk\n");
}

#[tokio::test]
async fn notification_always_succeeds_locally() {
    let h = harness();
    h.jobs.set_notification_failure(Some(500));

    h.executor
        .execute(&modification(
            Opcode::CreateInvalidTransfileNotification,
            "cause",
        ))
        .await
        .unwrap();

    let sent = h.jobs.notifications();
    assert_eq!(sent[0].destination_email, MISSING_FIELD);
    assert_eq!(sent[0].context.transfile_content, "");
}
