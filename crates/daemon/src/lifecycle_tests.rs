// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

fn config(tmp: &TempDir) -> Config {
    Config::parse(&format!(
        r#"
dir = "{}"
shadow_dir = "{}"
state_dir = "{}"
file_store_url = "http://127.0.0.1:1"
job_store_url = "http://127.0.0.1:1"
"#,
        tmp.path().join("in").display(),
        tmp.path().join("shadow").display(),
        tmp.path().join("state").display(),
    ))
    .unwrap()
}

#[tokio::test]
async fn startup_creates_directories_and_pid_file() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);

    let daemon = startup(&config).unwrap();

    assert!(config.dir.is_dir());
    assert!(config.shadow_dir.is_dir());
    assert!(config.wal_dir().is_dir());
    let pid = std::fs::read_to_string(config.lock_path()).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());

    daemon.state.shutdown();
    assert!(!config.lock_path().exists());
}

#[tokio::test]
async fn second_startup_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp);
    let _daemon = startup(&config).unwrap();

    let result = startup(&config);

    assert!(matches!(result, Err(LifecycleError::LockFailed(_))));
    // The running daemon keeps its pid file
    assert!(config.lock_path().exists());
}

#[tokio::test]
async fn failed_startup_removes_pid_file() {
    let tmp = TempDir::new().unwrap();
    let mut config = config(&tmp);
    // A file where the WAL directory should be
    let blocker = tmp.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    config.wal_dir = Some(blocker.join("wal"));

    assert!(startup(&config).is_err());
    assert!(!config.lock_path().exists());
}
