//! Shared helpers for the integration suites.

#![allow(dead_code)]

use chrono::{Duration, Utc};
use distlog::prelude::*;
use distlog::{EntryId, LogStore, Timestamp};
use tracing_subscriber::EnvFilter;

/// Route `tracing` output through the test harness (`RUST_LOG` controls it)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Ephemeral log tracking `User` (excluding `username`) and `Source`
pub fn test_log() -> DistLog {
    init_tracing();
    DistLog::builder()
        .ephemeral()
        .client_id("test")
        .rng_seed(0x5eed)
        .track("User", ExclusionPolicy::new().except("username"))
        .track("Source", ExclusionPolicy::new())
        .open()
        .expect("Failed to open ephemeral log")
}

/// `User` record with the usual fields
pub fn user(id: u64, name: &str) -> Record {
    Record::new("User", id)
        .with("name", name)
        .with("username", format!("{}-login", name.to_lowercase()))
        .with("email", format!("{}@example.com", name.to_lowercase()))
}

/// `Source` record
pub fn source(id: u64, url: &str) -> Record {
    Record::new("Source", id).with("url", url)
}

/// Build an attribute map from string pairs
pub fn attrs(pairs: &[(&str, &str)]) -> Attributes {
    pairs
        .iter()
        .map(|(field, value)| (field.to_string(), Value::from(*value)))
        .collect()
}

/// An instant well past the default error cooldown
pub fn long_ago() -> Timestamp {
    Utc::now() - Duration::hours(2)
}

/// Mark `id` errored as if it failed long ago
pub fn fail_long_ago(log: &DistLog, id: EntryId) {
    log.store()
        .mark_errored(id, long_ago())
        .expect("Failed to backdate error");
}
