//! Reopen, torn tails, compaction.

use crate::common::*;
use distlog::prelude::*;
use distlog::{Config, DurabilityMode, LogStore, SubjectType};
use std::fs::{self, OpenOptions};
use tempfile::TempDir;

fn open(dir: &TempDir) -> DistLog {
    init_tracing();
    DistLog::builder()
        .path(dir.path())
        .strict()
        .rng_seed(1)
        .track("User", ExclusionPolicy::new().except("username"))
        .track("Source", ExclusionPolicy::new())
        .open()
        .unwrap()
}

#[test]
fn queue_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let (claimed, tagged, failed) = {
        let log = open(&dir);
        let sources = log.table("Source");
        for i in 1..=3 {
            sources.insert(source(i, "http://x")).unwrap();
        }
        let entries = log.store().list(&Default::default()).unwrap();
        log.queue.delete(&entries[0]).unwrap();
        log.queue.append_tag(&entries[1], Tag::Event).unwrap();
        log.queue.record_error(&entries[2]).unwrap();
        (entries[0].clone(), entries[1].clone(), entries[2].clone())
    };

    let log = open(&dir);
    assert_eq!(log.recovery().unwrap().entries_restored, 2);
    assert!(log.store().get(claimed.id).unwrap().is_none());
    assert_eq!(
        log.queue.next_row(Selector::RestrictedSourceOnly).unwrap().id,
        tagged.id
    );
    assert!(log.queue.next_row(Selector::All).is_none());

    let stored = log.store().get(failed.id).unwrap().unwrap();
    assert!(stored.error);
    // still cooling down after the restart
    assert!(log.queue.next_errored_row(Selector::All).is_none());
}

#[test]
fn appends_after_reopen_keep_fifo_order() {
    let dir = TempDir::new().unwrap();
    let before = {
        let log = open(&dir);
        log.table("User").insert(user(1, "A")).unwrap();
        log.queue.next_row(Selector::All).unwrap()
    };

    let log = open(&dir);
    log.table("User").insert(user(2, "B")).unwrap();

    let entries = log.store().list(&Default::default()).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, before.id);
    assert!(entries[1].id > before.id);
    assert!(entries[1].created_at > before.created_at);
}

#[test]
fn torn_tail_loses_only_the_last_record() {
    let dir = TempDir::new().unwrap();
    {
        let log = open(&dir);
        let users = log.table("User");
        users.insert(user(1, "A")).unwrap();
        users.insert(user(2, "B")).unwrap();
    }

    let wal = dir.path().join(distlog::distlog_durability::WAL_FILENAME);
    let len = fs::metadata(&wal).unwrap().len();
    OpenOptions::new()
        .write(true)
        .open(&wal)
        .unwrap()
        .set_len(len - 3)
        .unwrap();

    let log = open(&dir);
    assert!(log.recovery().unwrap().truncated_bytes > 0);
    let entries = log.store().list(&Default::default()).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].changes.get("name"), Some(&Value::from("A")));
}

#[test]
fn compaction_keeps_live_rows_only() {
    let dir = TempDir::new().unwrap();
    {
        let log = open(&dir);
        let users = log.table("User");
        for i in 0..50 {
            users.insert(user(i, "C")).unwrap();
        }
        for entry in log.store().list(&Default::default()).unwrap().iter().skip(5) {
            log.queue.delete(entry).unwrap();
        }
        let stats = log.compact().unwrap();
        assert_eq!(stats.entries, 5);
        assert!(stats.bytes_after < stats.bytes_before);
    }

    let log = open(&dir);
    assert_eq!(log.recovery().unwrap().records_replayed, 5);
    assert_eq!(log.store().len().unwrap(), 5);
}

#[test]
fn config_file_drives_open() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("distlog.toml");
    fs::write(
        &config_path,
        r#"
client_id = "web-1"

[durability]
mode = "none"

[queue]
error_cooldown_secs = 0

[tracked.User]
except = ["email"]
"#,
    )
    .unwrap();

    let config = Config::load(&config_path).unwrap();
    let log = DistLog::open_with_config(dir.path().join("db"), &config).unwrap();

    assert_eq!(log.durability_mode(), Some(DurabilityMode::None));
    assert!(log.capture.is_enabled(&SubjectType::new("User")));

    log.table("User").insert(user(1, "A")).unwrap();
    let entry = log.queue.next_row(Selector::All).unwrap();
    assert_eq!(entry.client_id.as_deref(), Some("web-1"));
    assert!(entry.changes.get("email").is_none());
    assert!(entry.changes.get("username").is_some());
}

#[test]
fn second_handle_on_a_live_directory_is_refused() {
    let dir = TempDir::new().unwrap();
    let app = open(&dir);
    app.table("User").insert(user(1, "A")).unwrap();

    let err = DistLog::open(dir.path()).unwrap_err();
    assert!(!err.is_not_found());
    assert!(err.to_string().contains("already open"), "{}", err);

    app.table("User").insert(user(2, "B")).unwrap();
    drop(app);

    let log = open(&dir);
    assert_eq!(log.store().len().unwrap(), 2);
}
