//! Error quarantine and randomized retry.

use crate::common::*;
use chrono::{Duration as ChronoDuration, Utc};
use distlog::prelude::*;
use distlog::{EntryId, LogStore};
use std::collections::HashSet;
use std::time::Duration;

fn seed_users(log: &DistLog, n: u64) -> Vec<LogEntry> {
    let users = log.table("User");
    for i in 1..=n {
        users.insert(user(i, &format!("U{}", i))).unwrap();
    }
    log.store().list(&Default::default()).unwrap()
}

#[test]
fn record_error_quarantines_without_deleting() {
    let log = test_log();
    let entries = seed_users(&log, 2);

    log.queue.record_error(&entries[0]).unwrap();

    let stored = log.store().get(entries[0].id).unwrap().unwrap();
    assert!(stored.error);
    assert!(stored.processed_at.is_some());
    assert_eq!(log.store().len().unwrap(), 2);
    assert_eq!(log.queue.next_row(Selector::All).unwrap().id, entries[1].id);
}

#[test]
fn fresh_errors_wait_out_the_cooldown() {
    let log = test_log();
    let entries = seed_users(&log, 3);
    for entry in &entries {
        log.queue.record_error(entry).unwrap();
    }

    for _ in 0..20 {
        assert!(log.queue.next_errored_row(Selector::All).is_none());
    }
    assert_eq!(log.queue.errored_count(Selector::All).unwrap(), 3);
}

#[test]
fn rows_errored_just_inside_the_window_stay_hidden() {
    let log = test_log();
    let entries = seed_users(&log, 2);
    let inside = Utc::now() - ChronoDuration::minutes(29);
    let outside = Utc::now() - ChronoDuration::minutes(31);
    log.store().mark_errored(entries[0].id, inside).unwrap();
    log.store().mark_errored(entries[1].id, outside).unwrap();

    for _ in 0..20 {
        assert_eq!(
            log.queue.next_errored_row(Selector::All).unwrap().id,
            entries[1].id
        );
    }
}

#[test]
fn single_eligible_error_is_always_returned() {
    let log = test_log();
    let entries = seed_users(&log, 3);
    fail_long_ago(&log, entries[1].id);

    for _ in 0..50 {
        assert_eq!(
            log.queue.next_errored_row(Selector::All).unwrap().id,
            entries[1].id
        );
    }
}

#[test]
fn many_eligible_errors_are_picked_at_random() {
    let log = test_log();
    let entries = seed_users(&log, 6);
    for entry in &entries {
        fail_long_ago(&log, entry.id);
    }

    let seen: HashSet<EntryId> = (0..300)
        .filter_map(|_| log.queue.next_errored_row(Selector::All))
        .map(|entry| entry.id)
        .collect();

    assert!(seen.len() > 1, "only saw {:?}", seen);
    assert!(seen.iter().all(|id| entries.iter().any(|e| e.id == *id)));
}

#[test]
fn errored_selection_respects_tags() {
    let log = test_log();
    log.table("Source").insert(source(1, "http://a")).unwrap();
    let entry = log.queue.next_row(Selector::All).unwrap();
    fail_long_ago(&log, entry.id);

    // not yet through the event stage
    assert!(log.queue.next_errored_row(Selector::RestrictedSourceOnly).is_none());
    assert_eq!(log.queue.next_errored_row(Selector::All).unwrap().id, entry.id);

    log.queue.append_tag(&entry, Tag::Event).unwrap();
    assert!(log.queue.next_errored_row(Selector::All).is_none());
    assert_eq!(
        log.queue
            .next_errored_row(Selector::RestrictedSourceOnly)
            .unwrap()
            .id,
        entry.id
    );
}

#[test]
fn retried_failure_restarts_the_cooldown() {
    let log = test_log();
    let entries = seed_users(&log, 1);
    fail_long_ago(&log, entries[0].id);

    let retry = log.queue.next_errored_row(Selector::All).unwrap();
    log.queue.record_error(&retry).unwrap();

    assert!(log.queue.next_errored_row(Selector::All).is_none());
}

#[test]
fn custom_cooldown_from_builder() {
    let log = DistLog::builder()
        .ephemeral()
        .error_cooldown(Duration::from_millis(0))
        .track("User", ExclusionPolicy::new())
        .open()
        .unwrap();
    let entries = seed_users(&log, 1);

    log.queue.record_error(&entries[0]).unwrap();
    std::thread::sleep(Duration::from_millis(5));

    assert_eq!(
        log.queue.next_errored_row(Selector::All).unwrap().id,
        entries[0].id
    );
}

#[test]
fn seeded_logs_pick_the_same_sequence() {
    let picks = |seed: u64| -> Vec<EntryId> {
        let log = DistLog::builder()
            .ephemeral()
            .rng_seed(seed)
            .track("User", ExclusionPolicy::new())
            .open()
            .unwrap();
        for entry in seed_users(&log, 8) {
            fail_long_ago(&log, entry.id);
        }
        (0..20)
            .filter_map(|_| log.queue.next_errored_row(Selector::All))
            .map(|entry| entry.id)
            .collect()
    };

    assert_eq!(picks(11), picks(11));
}
