//! Create / update / destroy capture scenarios.

use crate::common::*;
use distlog::prelude::*;
use distlog::LogStore;

#[test]
fn create_logs_snapshot_without_excluded_fields() {
    let log = test_log();
    let users = log.table("User");

    users.insert(user(1, "Brandon")).unwrap();

    let entries = log.store().list(&Default::default()).unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.action, Action::Create);
    assert_eq!(entry.subject_type.as_str(), "User");
    assert_eq!(entry.subject_id.as_str(), "1");
    assert_eq!(
        entry.changes,
        attrs(&[("email", "brandon@example.com"), ("name", "Brandon")])
    );
    for hidden in ["username", "id", "type", "created_at", "updated_at"] {
        assert!(entry.changes.get(hidden).is_none(), "{} leaked", hidden);
    }
    assert_eq!(entry.client_id.as_deref(), Some("test"));
    assert!(!entry.error);
    assert!(entry.processed_at.is_none());
}

#[test]
fn update_of_only_excluded_field_logs_nothing() {
    let log = test_log();
    let users = log.table("User");
    let brandon = users.insert(user(1, "Brandon")).unwrap();

    users.save(brandon.with("username", "bk")).unwrap();

    assert_eq!(log.store().len().unwrap(), 1);
}

#[test]
fn update_logs_only_changed_tracked_fields() {
    let log = test_log();
    let users = log.table("User");
    let brandon = users.insert(user(1, "Brandon")).unwrap();

    users
        .save(brandon.with("name", "Brandon K").with("username", "bk"))
        .unwrap();

    let entries = log.store().list(&Default::default()).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].action, Action::Update);
    assert_eq!(entries[1].changes, attrs(&[("name", "Brandon K")]));
}

#[test]
fn destroy_logs_full_snapshot_before_removal() {
    let log = test_log();
    let users = log.table("User");
    let brandon = users
        .insert(user(1, "Brandon").with("uuid", "u1"))
        .unwrap();

    assert!(users.destroy(&brandon.id).unwrap());
    assert!(users.find(&brandon.id).is_none());

    let entries = log.capture.entries_for(&brandon).unwrap();
    let destroy = entries.last().unwrap();
    assert_eq!(destroy.action, Action::Destroy);
    assert_eq!(
        destroy.changes,
        attrs(&[
            ("email", "brandon@example.com"),
            ("name", "Brandon"),
            ("uuid", "u1")
        ])
    );
    assert!(destroy.messages.is_empty());
}

#[test]
fn pending_message_is_written_with_trailing_separator() {
    let log = test_log();
    let users = log.table("User");

    let brandon = users.insert(user(1, "Brandon").message("hello")).unwrap();
    let created = log.queue.next_row(Selector::All).unwrap();
    assert_eq!(created.messages.as_str(), "hello ");

    // the pending message is not persisted with the entity
    let stored = users.find(&brandon.id).unwrap();
    assert!(stored.pending_message.is_none());

    let renamed = users.save(stored.with("name", "B")).unwrap();
    let entries = log.capture.entries_for(&renamed).unwrap();
    assert_eq!(entries[1].messages.as_str(), "");
}

#[test]
fn untracked_types_are_not_captured() {
    let log = test_log();
    let orders = log.table("Order");

    orders
        .insert(Record::new("Order", 1u64).with("total", 10i64))
        .unwrap();

    assert!(log.store().is_empty().unwrap());
}

#[test]
fn second_tracking_call_keeps_first_policy() {
    let log = test_log();
    assert!(!log.track("User", ExclusionPolicy::new().except("email")));

    log.table("User").insert(user(1, "Brandon")).unwrap();

    let entry = log.queue.next_row(Selector::All).unwrap();
    assert!(entry.changes.get("email").is_some());
    assert!(entry.changes.get("username").is_none());
}

#[test]
fn capturable_attributes_match_create_payload() {
    let log = test_log();
    let record = user(7, "Ada");

    let expected = log.capture.capturable_attributes(&record).unwrap();
    let created = log.table("User").insert(record).unwrap();

    let entry = log.capture.entries_for(&created).unwrap().remove(0);
    assert_eq!(entry.changes, expected);
}

#[test]
fn entries_come_back_in_append_order() {
    let log = test_log();
    let users = log.table("User");
    let mut last = None;
    for i in 0..20u64 {
        users.insert(user(i, &format!("U{}", i))).unwrap();
    }
    for entry in log.store().list(&Default::default()).unwrap() {
        if let Some((id, at)) = last {
            assert!(entry.id > id);
            assert!(entry.created_at > at);
        }
        last = Some((entry.id, entry.created_at));
    }
}
