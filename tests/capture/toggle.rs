//! Capture enable flag and scoped suspension through the facade.

use crate::common::*;
use distlog::prelude::*;
use distlog::{LogStore, SubjectType};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

#[test]
fn disabled_type_is_not_captured_until_reenabled() {
    let log = test_log();
    let users = log.table("User");
    let user_type = SubjectType::new("User");

    log.capture.disable(&user_type).unwrap();
    users.insert(user(1, "A")).unwrap();
    assert_eq!(log.store().len().unwrap(), 0);

    log.capture.enable(&user_type).unwrap();
    users.insert(user(2, "B")).unwrap();
    assert_eq!(log.store().len().unwrap(), 1);
}

#[test]
fn disabling_one_type_leaves_others_alone() {
    let log = test_log();
    log.capture.disable(&SubjectType::new("User")).unwrap();

    log.table("User").insert(user(1, "A")).unwrap();
    log.table("Source").insert(source(1, "http://a")).unwrap();

    let entries = log.store().list(&Default::default()).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].subject_type.as_str(), "Source");
}

#[test]
fn nested_suspension_stays_suspended_until_outermost_exit() {
    let log = test_log();
    let users = log.table("User");
    let user_type = SubjectType::new("User");

    log.capture.without_capturing(&user_type, || {
        log.capture.without_capturing(&user_type, || {
            users.insert(user(1, "A")).unwrap();
        });
        // inner scope closed; outer scope still suspends capture
        users.insert(user(2, "B")).unwrap();
        assert!(!log.capture.is_enabled(&user_type));
    });

    assert!(log.capture.is_enabled(&user_type));
    assert_eq!(log.store().len().unwrap(), 0);
}

#[test]
fn suspension_ends_when_the_block_panics() {
    let log = test_log();
    let user_type = SubjectType::new("User");

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        log.capture
            .without_capturing(&user_type, || panic!("consumer bug"));
    }));
    assert!(result.is_err());
    assert!(log.capture.is_enabled(&user_type));
}

#[test]
fn save_without_capturing_persists_silently() {
    let log = test_log();
    let users = log.table("User");
    let stored = users.create_without_capturing(user(1, "A")).unwrap();

    let saved = users
        .save_without_capturing(stored.with("name", "Z"))
        .unwrap();

    assert_eq!(saved.get("name"), Some(&Value::from("Z")));
    assert!(log.store().is_empty().unwrap());
    assert!(log.capture.is_enabled(&SubjectType::new("User")));
}

#[test]
fn capture_from_many_threads_keeps_every_row() {
    let log = Arc::new(test_log());
    let handles: Vec<_> = (0..4u64)
        .map(|t| {
            let log = Arc::clone(&log);
            thread::spawn(move || {
                let users = log.table("User");
                for i in 0..50u64 {
                    users.insert(user(t * 1000 + i, "T")).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let entries = log.store().list(&Default::default()).unwrap();
    assert_eq!(entries.len(), 200);
    assert!(entries.windows(2).all(|w| w[0].created_at < w[1].created_at));
}
