//! # distlog
//!
//! Change-data-capture through a shared append-only log.
//!
//! Every create, update and destroy of a tracked entity appends a row
//! describing the change. Independent consumers poll the log, claim rows by
//! deleting them, hand rows between pipeline stages with tags, and quarantine
//! failures for a randomized retry after a cooldown.
//!
//! ## Quick Start
//!
//! ```ignore
//! use distlog::prelude::*;
//!
//! let log = DistLog::builder()
//!     .path("./log")
//!     .track("User", ExclusionPolicy::new().except("username"))
//!     .open()?;
//!
//! // Producer: mutations through a tracked table are captured
//! let users = log.table("User");
//! let user = users.insert(Record::new("User", 1u64).with("name", "Alice"))?;
//!
//! // Consumer: oldest pending row first
//! if let Some(entry) = log.queue.next_row(Selector::All) {
//!     log.queue.delete(&entry)?;
//! }
//! ```
//!
//! ## Tag Protocol
//!
//! - [`Selector::All`] skips rows tagged `event`
//! - [`Selector::RestrictedSourceOnly`] sees only `Source` rows tagged
//!   `event` and not yet tagged `source`
//!
//! ## Layers
//!
//! - [`distlog_core`] - rows, values, selectors, errors
//! - [`distlog_storage`] - `LogStore` trait and in-memory store
//! - [`distlog_durability`] - WAL-backed store
//! - [`distlog_capture`] - capture interceptor and reference table
//! - [`distlog_queue`] - consumer protocol

#![warn(missing_docs)]

mod config;
mod database;
mod error;

pub mod prelude;

// Re-export main entry points
pub use config::{Config, DurabilityConfig, QueueSection};
pub use database::{DistLog, DistLogBuilder, LogStats};
pub use error::{Error, Result};

// Re-export layer types
pub use distlog_capture::{
    Capture, CaptureRegistry, CaptureToggle, EntityTable, ExclusionPolicy, Record, SuspendGuard,
    Tracked,
};
pub use distlog_core::{
    Action, Attributes, EntryFilter, EntryId, LogEntry, Messages, NewLogEntry, Selector,
    SubjectId, SubjectType, Tag, Timestamp, Value,
};
pub use distlog_durability::{CompactionStats, DurabilityMode, RecoveryStats, WalStore};
pub use distlog_queue::{Queue, QueueConfig};
pub use distlog_storage::{LogStore, MemoryStore};

pub use distlog_capture;
pub use distlog_core;
pub use distlog_durability;
pub use distlog_queue;
pub use distlog_storage;
