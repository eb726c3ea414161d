//! Property tests for exclusion filtering and update diffs.

use crate::common::*;
use distlog::prelude::*;
use distlog::LogStore;
use proptest::prelude::*;
use std::collections::BTreeMap;

const FIELDS: [&str; 8] = [
    "id", "type", "created_at", "updated_at", "username", "name", "email", "score",
];

fn excluded(field: &str) -> bool {
    matches!(
        field,
        "id" | "type" | "created_at" | "updated_at" | "username"
    )
}

fn arb_attributes() -> impl Strategy<Value = BTreeMap<String, i64>> {
    proptest::collection::btree_map(
        proptest::sample::select(FIELDS.to_vec()).prop_map(str::to_string),
        0i64..5,
        0..FIELDS.len(),
    )
}

fn record(id: u64, fields: &BTreeMap<String, i64>) -> Record {
    fields
        .iter()
        .fold(Record::new("User", id), |record, (field, value)| {
            record.with(field.as_str(), *value)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn create_logs_exactly_the_non_excluded_snapshot(fields in arb_attributes()) {
        let log = test_log();
        log.table("User").insert(record(1, &fields)).unwrap();

        let entry = log.queue.next_row(Selector::All).unwrap();
        let expected: Attributes = fields
            .iter()
            .filter(|(field, _)| !excluded(field))
            .map(|(field, value)| (field.clone(), Value::Int(*value)))
            .collect();
        prop_assert_eq!(entry.changes, expected);
    }

    #[test]
    fn excluded_only_updates_append_nothing(
        fields in arb_attributes(),
        bump in 1i64..100,
    ) {
        let log = test_log();
        let users = log.table("User");
        let stored = users.insert(record(1, &fields)).unwrap();
        let before = log.store().len().unwrap();

        // `id` and `type` are skipped: the table keys on them
        let edited = stored.with("username", bump).with("updated_at", bump);
        users.save(edited).unwrap();

        prop_assert_eq!(log.store().len().unwrap(), before);
    }

    #[test]
    fn updates_log_exactly_the_changed_tracked_fields(
        original in arb_attributes(),
        edits in arb_attributes(),
    ) {
        let log = test_log();
        let users = log.table("User");
        let stored = users.insert(record(1, &original)).unwrap();

        let edited = edits
            .iter()
            .filter(|(field, _)| field.as_str() != "created_at")
            .fold(stored.clone(), |record, (field, value)| record.with(field.as_str(), *value));
        users.save(edited).unwrap();

        let expected: Attributes = edits
            .iter()
            .filter(|(field, _)| !excluded(field))
            .filter(|(field, value)| stored.get(field.as_str()) != Some(&Value::Int(**value)))
            .map(|(field, value)| (field.clone(), Value::Int(*value)))
            .collect();

        let entries = log.capture.entries_for(&stored).unwrap();
        if expected.is_empty() {
            prop_assert_eq!(entries.len(), 1);
        } else {
            prop_assert_eq!(entries.len(), 2);
            prop_assert_eq!(&entries[1].changes, &expected);
        }
    }

    #[test]
    fn destroys_log_the_snapshot_held_before_removal(fields in arb_attributes()) {
        let log = test_log();
        let users = log.table("User");
        let stored = users.insert(record(1, &fields)).unwrap();
        let expected = log.capture.capturable_attributes(&stored).unwrap();

        users.destroy(&stored.id).unwrap();

        let entries = log.capture.entries_for(&stored).unwrap();
        prop_assert_eq!(entries[1].action, Action::Destroy);
        prop_assert_eq!(&entries[1].changes, &expected);
    }
}
