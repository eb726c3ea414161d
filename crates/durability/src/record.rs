//! WAL record types
//!
//! One record per state-changing store operation:
//! - Append: a new row, with its allocated id and `created_at`
//! - Tag: a tag appended to a row's `messages`
//! - Errored: a row quarantined by `record_error`
//! - Delete: a row claimed by a consumer
//!
//! Replaying the records in file order rebuilds the live log exactly.

use distlog_core::{EntryId, LogEntry, Tag, Timestamp};
use serde::{Deserialize, Serialize};

/// WAL record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum WalRecord {
    /// Row appended
    Append(LogEntry),

    /// Tag appended to a row
    Tag {
        /// Row being tagged
        id: EntryId,
        /// Tag written
        tag: Tag,
    },

    /// Row marked errored
    Errored {
        /// Row being quarantined
        id: EntryId,
        /// Value written to `processed_at`
        at: Timestamp,
    },

    /// Row deleted
    Delete {
        /// Row removed
        id: EntryId,
    },
}

impl WalRecord {
    /// Row this record touches
    pub fn entry_id(&self) -> EntryId {
        match self {
            WalRecord::Append(entry) => entry.id,
            WalRecord::Tag { id, .. } => *id,
            WalRecord::Errored { id, .. } => *id,
            WalRecord::Delete { id } => *id,
        }
    }

    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            WalRecord::Append(_) => "append",
            WalRecord::Tag { .. } => "tag",
            WalRecord::Errored { .. } => "errored",
            WalRecord::Delete { .. } => "delete",
        }
    }
}
