// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end dispatch against fake upstream stores

#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use gk_adapters::{FakeFileStore, FakeJobStore};
use gk_core::jobspec::INTERNAL_ADDRESS;
use gk_core::{FakeClock, Modification, Opcode, ShutdownManager, WriteAheadLog};
use gk_daemon::{watcher, Config, Dispatcher, OperationExecutor};
use tempfile::TempDir;

struct Env {
    tmp: TempDir,
    config: Config,
    files: FakeFileStore,
    jobs: FakeJobStore,
    shutdown: ShutdownManager,
}

impl Env {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let config = Config::parse(&format!(
            r#"
dir = "{}"
shadow_dir = "{}"
state_dir = "{}"
file_store_url = "http://files"
job_store_url = "http://jobs"
cc_mail = "ops@example.org"

[[destinations]]
submitter = 123456
destination = "shared"
packaging = "xml"
format = "basis"
copy_to_shadow = true
"#,
            tmp.path().join("in").display(),
            tmp.path().join("shadow").display(),
            tmp.path().join("state").display(),
        ))
        .unwrap();
        std::fs::create_dir_all(&config.dir).unwrap();

        Self {
            tmp,
            config,
            files: FakeFileStore::new(),
            jobs: FakeJobStore::new(),
            shutdown: ShutdownManager::new(),
        }
    }

    fn dispatcher(&self) -> Dispatcher<FakeFileStore, FakeJobStore, FakeClock> {
        let wal = WriteAheadLog::open(&self.config.wal_dir(), 1000).unwrap();
        let executor = OperationExecutor::new(
            &self.config.dir,
            &self.config.shadow_dir,
            self.files.clone(),
            self.jobs.clone(),
        )
        .with_mapper(gk_core::JobSpecificationMapper::new(self.config.cc_mail.clone()));
        Dispatcher::new(
            &self.config,
            wal,
            executor,
            self.shutdown.clone(),
            FakeClock::new(),
        )
    }

    fn inbound(&self, name: &str) -> PathBuf {
        self.config.dir.join(name)
    }

    fn shadow(&self, name: &str) -> PathBuf {
        self.config.shadow_dir.join(name)
    }

    fn write(&self, name: &str, content: &str) {
        std::fs::write(self.inbound(name), content).unwrap();
    }
}

fn inbound_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

#[tokio::test]
async fn mixed_transfile_is_routed_per_destination() {
    let env = Env::new();
    env.write("123456.data", "local records");
    env.write("123456.shared", "shared records");
    env.write(
        "123456.trans",
        "b=danbib,f=123456.data,m=user@lib.dk\n\
         b=shared,f=123456.shared,t=xml,o=basis,m=user@lib.dk\n\
         slut\n",
    );
    let mut dispatcher = env.dispatcher();

    dispatcher.scan().await.unwrap();

    assert!(inbound_is_empty(&env.config.dir));
    assert!(dispatcher.wal().is_empty());

    // Both lines become jobs, each with its own upload
    let jobs = env.jobs.jobs();
    assert_eq!(jobs.len(), 2);
    assert_eq!(env.files.len(), 2);
    assert_eq!(
        jobs[0]
            .job_specification
            .mail_for_notification_about_verification,
        "user@lib.dk;ops@example.org"
    );

    // The shared datafile and a rewritten transfile go to the legacy system
    assert_eq!(
        std::fs::read_to_string(env.shadow("123456.shared")).unwrap(),
        "shared records"
    );
    let forwarded = std::fs::read_to_string(env.shadow("123456.trans")).unwrap();
    assert!(forwarded.contains(&format!("m={}", INTERNAL_ADDRESS)));
    assert!(forwarded.contains("b=shared"));
    assert!(!forwarded.contains("danbib"));
    assert!(forwarded.ends_with("\nslut"));
    assert!(!env.shadow("123456.data").exists());
}

#[tokio::test]
async fn invalid_transfile_is_reported_and_removed() {
    let env = Env::new();
    env.write("123456.trans", "f=123456.data,b=danbib,m=user@lib.dk\nslut\n");
    let mut dispatcher = env.dispatcher();

    dispatcher.scan().await.unwrap();

    assert!(inbound_is_empty(&env.config.dir));
    assert!(env.jobs.jobs().is_empty());
    let sent = env.jobs.notifications();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].destination_email, "user@lib.dk");
    assert!(sent[0].context.cause.contains("linje 1"));
}

#[tokio::test]
async fn restart_replays_work_left_in_the_wal() {
    let env = Env::new();
    env.write("123456.trans", "b=danbib\nslut\n");
    {
        // A previous run queued the work and stopped before executing it
        let mut wal = WriteAheadLog::open(&env.config.wal_dir(), 1000).unwrap();
        wal.append(vec![
            Modification::new("123456.trans", Opcode::CreateJob, "b=danbib"),
            Modification::new("123456.trans", Opcode::DeleteFile, "123456.trans"),
        ])
        .unwrap();
    }
    let mut dispatcher = env.dispatcher();

    dispatcher.recover().await.unwrap();

    assert_eq!(env.jobs.jobs().len(), 1);
    assert!(inbound_is_empty(&env.config.dir));
    assert!(dispatcher.wal().is_empty());
}

#[tokio::test]
async fn watched_directory_is_dispatched_until_shutdown() {
    let env = Env::new();
    let (_watcher, mut events) = watcher::watch(&env.config.dir, 64).unwrap();
    let mut dispatcher = env.dispatcher();
    let transfile = env.inbound("123456.trans");

    let driver = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        std::fs::write(env.inbound("123456.data"), "payload").unwrap();
        std::fs::write(&transfile, "b=danbib,f=123456.data\nslut\n").unwrap();
        tokio::time::timeout(Duration::from_secs(10), async {
            while transfile.exists() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
        env.shutdown.signal_shutdown_in_progress();
    };
    let (result, ()) = tokio::join!(dispatcher.run(&mut events), driver);

    result.unwrap();
    assert_eq!(env.jobs.jobs().len(), 1);
    assert!(!env.inbound("123456.data").exists());
    assert!(env.tmp.path().join("state/wal/wal.jsonl").exists());
}
