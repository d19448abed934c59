// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

//! Integration tests for planning dispatch from an inbound directory
//!
//! Transfiles are found on disk, decided, and queued in the WAL the way the
//! daemon does it, including recovery after a crash mid-drain.

use gk_core::storage::read_pending;
use gk_core::{
    find_files_with_extension, Charset, GatekeeperDestination, ModificationFactory, Opcode,
    Transfile, WalError, WriteAheadLog,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const EXTENSIONS: &[&str] = &[".trans", ".trs"];

fn shared_dfa() -> GatekeeperDestination {
    GatekeeperDestination {
        submitter: 123456,
        destination: "dfa".to_string(),
        packaging: "lin".to_string(),
        format: "marc2".to_string(),
        copy_to_shadow: true,
        notify_from_shadow: false,
    }
}

/// Decide every complete transfile in `dir` and queue the result
fn plan(dir: &Path, wal: &mut WriteAheadLog, factory: &ModificationFactory) -> Vec<u64> {
    let mut ids = Vec::new();
    for path in find_files_with_extension(dir, EXTENSIONS).unwrap().iter() {
        let transfile = Transfile::open(path, Charset::Latin5).unwrap();
        if !transfile.is_complete() {
            continue;
        }
        ids.extend(wal.append(factory.decide(&transfile)).unwrap());
    }
    ids
}

#[test]
fn plans_only_complete_transfiles() {
    let inbound = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    fs::write(inbound.path().join("123456.trans"), "b=danbib,f=123456.data\nslut\n").unwrap();
    fs::write(inbound.path().join("654321.trs"), "b=danbib,f=654321.data\n").unwrap();
    fs::write(inbound.path().join("123456.data"), "payload").unwrap();

    let mut wal = WriteAheadLog::open(state.path(), 1000).unwrap();
    let ids = plan(inbound.path(), &mut wal, &ModificationFactory::default());

    assert_eq!(ids, vec![1, 2, 3]);
    let queued: Vec<_> = wal
        .list()
        .into_iter()
        .map(|m| (m.opcode, m.arg, m.transfile_name))
        .collect();
    assert_eq!(
        queued,
        vec![
            (
                Opcode::CreateJob,
                "b=danbib,f=123456.data".to_string(),
                "123456.trans".to_string()
            ),
            (
                Opcode::DeleteFile,
                "123456.data".to_string(),
                "123456.trans".to_string()
            ),
            (
                Opcode::DeleteFile,
                "123456.trans".to_string(),
                "123456.trans".to_string()
            ),
        ]
    );
}

#[test]
fn invalid_and_shared_transfiles_are_planned_in_order() {
    let inbound = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    fs::write(
        inbound.path().join("123456.trans"),
        "b=dfa,f=123456.file,t=lin,o=marc2\nslut\n",
    )
    .unwrap();

    let factory = ModificationFactory::new(vec![shared_dfa()]);
    let mut wal = WriteAheadLog::open(state.path(), 1000).unwrap();
    plan(inbound.path(), &mut wal, &factory);

    fs::remove_file(inbound.path().join("123456.trans")).unwrap();
    fs::write(inbound.path().join("777777.trans"), "b=dfa,,f=x\nslut\n").unwrap();
    plan(inbound.path(), &mut wal, &factory);

    let opcodes: Vec<_> = wal.list().into_iter().map(|m| m.opcode).collect();
    assert_eq!(
        opcodes,
        vec![
            Opcode::CreateJob,
            Opcode::MoveFile,
            Opcode::CreateTransfile,
            Opcode::DeleteFile,
            Opcode::CreateInvalidTransfileNotification,
            Opcode::DeleteFile,
        ]
    );
    let notification = &wal.list()[4];
    assert_eq!(notification.transfile_name, "777777.trans");
    assert!(notification.arg.starts_with("Transfil indeholder ugyldig linje 1"));
}

#[test]
fn crash_mid_drain_blocks_until_unlocked() {
    let inbound = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    fs::write(inbound.path().join("123456.trans"), "b=danbib,f=123456.data\nslut\n").unwrap();

    {
        let mut wal = WriteAheadLog::open(state.path(), 1000).unwrap();
        plan(inbound.path(), &mut wal, &ModificationFactory::default());
        let first = wal.next().unwrap().unwrap();
        assert_eq!(first.opcode, Opcode::CreateJob);
        // Crash before the job is confirmed
    }

    let pending = read_pending(state.path()).unwrap();
    assert_eq!(pending.len(), 3);
    assert!(pending[0].locked);

    let mut wal = WriteAheadLog::open(state.path(), 1000).unwrap();
    assert!(matches!(
        wal.next(),
        Err(WalError::ModificationLocked { id: 1 })
    ));

    wal.unlock(1).unwrap();
    let mut drained = Vec::new();
    while let Some(m) = wal.next().unwrap() {
        drained.push(m.opcode);
        wal.remove(m.id).unwrap();
    }
    assert_eq!(
        drained,
        vec![Opcode::CreateJob, Opcode::DeleteFile, Opcode::DeleteFile]
    );
    assert!(read_pending(state.path()).unwrap().is_empty());
}
