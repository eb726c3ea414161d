//! Log entry types
//!
//! A [`LogEntry`] is one row of the shared change log. Producers build a
//! [`NewLogEntry`]; the store assigns `id` and `created_at` on append.

use serde::{Deserialize, Serialize};

use crate::messages::{Messages, Tag};
use crate::types::{Action, EntryId, SubjectId, SubjectType, Timestamp};
use crate::value::Attributes;

/// A row in the change log
///
/// Presence in the log means the change has not been fully handled yet;
/// there is no separate "consumed" flag. Consumers finish with a row by
/// deleting it, or (two-stage rows) by tagging it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Row identity
    pub id: EntryId,
    /// Id of the tracked entity
    pub subject_id: SubjectId,
    /// Type discriminator of the tracked entity
    pub subject_type: SubjectType,
    /// Process that produced the change, for diagnostics
    pub client_id: Option<String>,
    /// Mutation kind
    pub action: Action,
    /// Loggable payload (never contains excluded fields)
    pub changes: Attributes,
    /// Tag bag plus free-form producer text
    pub messages: Messages,
    /// Quarantine flag set by `record_error`
    pub error: bool,
    /// When the row was last marked errored
    pub processed_at: Option<Timestamp>,
    /// Append time; strictly increasing in append order
    pub created_at: Timestamp,
}

impl LogEntry {
    /// Whether the row carries `tag`
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.messages.has_tag(tag)
    }

    /// Whether this row belongs to the restricted source pipeline
    pub fn is_restricted(&self) -> bool {
        self.subject_type.is_restricted()
    }
}

/// A change waiting to be appended
#[derive(Debug, Clone, PartialEq)]
pub struct NewLogEntry {
    /// Id of the tracked entity
    pub subject_id: SubjectId,
    /// Type discriminator of the tracked entity
    pub subject_type: SubjectType,
    /// Originating process
    pub client_id: Option<String>,
    /// Mutation kind
    pub action: Action,
    /// Loggable payload
    pub changes: Attributes,
    /// Initial `messages` text
    pub messages: Messages,
}

impl NewLogEntry {
    /// Start a new entry with an empty payload
    pub fn new(
        subject_type: impl Into<SubjectType>,
        subject_id: impl Into<SubjectId>,
        action: Action,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            subject_type: subject_type.into(),
            client_id: None,
            action,
            changes: Attributes::new(),
            messages: Messages::new(),
        }
    }

    /// Set the payload
    pub fn changes(mut self, changes: Attributes) -> Self {
        self.changes = changes;
        self
    }

    /// Set the initial `messages` text
    pub fn messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    /// Set the originating process
    pub fn client_id(mut self, client_id: Option<String>) -> Self {
        self.client_id = client_id;
        self
    }

    /// Turn into a stored row
    ///
    /// Only stores call this; they own id and clock allocation.
    pub fn into_entry(self, id: EntryId, created_at: Timestamp) -> LogEntry {
        LogEntry {
            id,
            subject_id: self.subject_id,
            subject_type: self.subject_type,
            client_id: self.client_id,
            action: self.action,
            changes: self.changes,
            messages: self.messages,
            error: false,
            processed_at: None,
            created_at,
        }
    }
}
