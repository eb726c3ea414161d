//! Selector visibility under the tag protocol.

use crate::common::*;
use distlog::prelude::*;
use distlog::LogStore;

fn seed_sources(log: &DistLog, n: u64) -> Vec<LogEntry> {
    let sources = log.table("Source");
    for i in 1..=n {
        sources.insert(source(i, &format!("http://s{}", i))).unwrap();
    }
    log.store().list(&Default::default()).unwrap()
}

#[test]
fn next_row_is_oldest_and_idempotent() {
    let log = test_log();
    let entries = seed_sources(&log, 3);

    for _ in 0..5 {
        assert_eq!(log.queue.next_row(Selector::All).unwrap().id, entries[0].id);
    }
}

#[test]
fn empty_log_has_no_next_row() {
    let log = test_log();
    assert!(log.queue.next_row(Selector::All).is_none());
    assert!(log.queue.next_row(Selector::RestrictedSourceOnly).is_none());
    assert!(log.queue.next_errored_row(Selector::All).is_none());
}

#[test]
fn event_tag_hands_source_row_to_second_stage() {
    let log = test_log();
    let entries = seed_sources(&log, 3);

    // untagged rows are not yet visible to the source stage
    assert!(log.queue.next_row(Selector::RestrictedSourceOnly).is_none());

    log.queue.append_tag(&entries[0], Tag::Event).unwrap();

    assert_eq!(log.queue.next_row(Selector::All).unwrap().id, entries[1].id);
    assert_eq!(
        log.queue.next_row(Selector::RestrictedSourceOnly).unwrap().id,
        entries[0].id
    );
}

#[test]
fn source_tag_hides_row_from_second_stage() {
    let log = test_log();
    let entries = seed_sources(&log, 2);
    for entry in &entries {
        log.queue.append_tag(entry, Tag::Event).unwrap();
    }

    log.queue.append_tag(&entries[0], Tag::Source).unwrap();

    assert_eq!(
        log.queue.next_row(Selector::RestrictedSourceOnly).unwrap().id,
        entries[1].id
    );
    assert!(log.queue.next_row(Selector::All).is_none());
}

#[test]
fn restricted_selector_ignores_other_types() {
    let log = test_log();
    let users = log.table("User");
    let stored = users.insert(user(1, "A")).unwrap();
    let entry = log.capture.entries_for(&stored).unwrap().remove(0);

    log.queue.append_tag(&entry, Tag::Event).unwrap();

    assert!(log.queue.next_row(Selector::RestrictedSourceOnly).is_none());
    assert_eq!(log.queue.pending_count(Selector::RestrictedSourceOnly).unwrap(), 0);
}

#[test]
fn tags_are_matched_as_whole_tokens() {
    let log = test_log();
    // a pending message that merely contains the word is not a tag
    log.table("User")
        .insert(user(1, "A").message("eventually"))
        .unwrap();

    let entry = log.queue.next_row(Selector::All).unwrap();
    assert_eq!(entry.messages.as_str(), "eventually ");
    assert!(!entry.has_tag(Tag::Event));
}

#[test]
fn tagging_appends_and_never_rewrites() {
    let log = test_log();
    log.table("User")
        .insert(user(1, "A").message("welcome"))
        .unwrap();
    let entry = log.queue.next_row(Selector::All).unwrap();

    log.queue.append_tag(&entry, Tag::Batch).unwrap();
    log.queue.append_tag(&entry, Tag::Event).unwrap();
    log.queue.append_tag(&entry, Tag::Event).unwrap();

    let stored = log.store().get(entry.id).unwrap().unwrap();
    assert_eq!(stored.messages.as_str(), "welcome batch event ");
}

#[test]
fn batch_tag_has_no_visibility_effect() {
    let log = test_log();
    let entries = seed_sources(&log, 1);
    log.queue.append_tag(&entries[0], Tag::Batch).unwrap();

    assert_eq!(log.queue.next_row(Selector::All).unwrap().id, entries[0].id);
}

#[test]
fn tagging_a_claimed_row_fails() {
    let log = test_log();
    let entries = seed_sources(&log, 1);
    assert!(log.queue.delete(&entries[0]).unwrap());

    let err = log.queue.append_tag(&entries[0], Tag::Event).unwrap_err();
    assert!(err.is_not_found());
}
