//! Durability layer for distlog
//!
//! This crate persists the change log with a write-ahead log:
//! - WalRecord types: Append, Tag, Errored, Delete
//! - Record framing with CRC32 checksums
//! - Durability modes: None, Strict, Batched (default)
//! - Recovery: replay the WAL, truncating a torn tail
//! - Compaction: rewrite the WAL down to the live rows

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod encoding;
pub mod mode;
pub mod record;
pub mod store;
pub mod wal;

pub use encoding::{decode_record, encode_record, Decoded};
pub use mode::DurabilityMode;
pub use record::WalRecord;
pub use store::{CompactionStats, RecoveryStats, WalStore, LOCK_FILENAME, WAL_FILENAME};
pub use wal::{Wal, WalRecovery};
