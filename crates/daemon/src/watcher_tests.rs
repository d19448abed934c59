// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use notify::event::{CreateKind, Flag, ModifyKind, RemoveKind};
use std::time::Duration;

#[test]
fn writes_become_changed_events() {
    let path = PathBuf::from("/in/123456.trans");
    for kind in [
        EventKind::Create(CreateKind::File),
        EventKind::Modify(ModifyKind::Any),
        EventKind::Access(AccessKind::Close(AccessMode::Write)),
    ] {
        let event = Event::new(kind).add_path(path.clone());
        assert_eq!(translate(event), vec![WatchEvent::Changed(path.clone())]);
    }
}

#[test]
fn removals_are_ignored() {
    let event = Event::new(EventKind::Remove(RemoveKind::File)).add_path("/in/x".into());
    assert!(translate(event).is_empty());
}

#[test]
fn rescan_flag_requests_rescan() {
    let event = Event::new(EventKind::Other).set_flag(Flag::Rescan);
    assert_eq!(translate(event), vec![WatchEvent::Rescan]);
}

#[tokio::test]
async fn reports_new_files() {
    let dir = tempfile::tempdir().unwrap();
    let (_watcher, mut rx) = watch(dir.path(), 16).unwrap();
    let path = dir.path().join("123456.trans");
    std::fs::write(&path, "slut\n").unwrap();

    let seen = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(event) = rx.recv().await {
            match event {
                WatchEvent::Changed(p) if p.file_name() == path.file_name() => return true,
                _ => continue,
            }
        }
        false
    })
    .await
    .unwrap();

    assert!(seen);
}
