//! Consumer selectors and row filters
//!
//! A [`Selector`] names which pipeline stage a consumer runs. Combined with
//! the tag protocol it decides which rows that consumer may still see:
//!
//! | selector | admits |
//! |---|---|
//! | `All` | any row not tagged `event` |
//! | `RestrictedSourceOnly` | `Source` rows tagged `event` but not `source` |
//!
//! Rows of type `Source` pass through both stages: the `All` consumer handles
//! them first and tags them `event`, then the restricted consumer handles them
//! and removes them.
//!
//! [`EntryFilter`] is the query form stores evaluate: selector visibility plus
//! the error flag and the retry cooldown.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entry::LogEntry;
use crate::error::Error;
use crate::messages::Tag;
use crate::types::{SubjectId, SubjectType, Timestamp};

/// Which consumer stage is polling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// General consumer: every subject type, rows not yet handled by the event stage
    #[default]
    All,
    /// Source updater: `Source` rows the event stage has finished with
    RestrictedSourceOnly,
}

impl Selector {
    /// Whether a row is visible to this selector under the tag protocol
    pub fn admits(&self, entry: &LogEntry) -> bool {
        match self {
            Selector::All => !entry.has_tag(Tag::Event),
            Selector::RestrictedSourceOnly => {
                entry.is_restricted() && entry.has_tag(Tag::Event) && !entry.has_tag(Tag::Source)
            }
        }
    }

    /// Short name used in logs and the CLI
    pub fn as_str(&self) -> &'static str {
        match self {
            Selector::All => "all",
            Selector::RestrictedSourceOnly => "source",
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Selector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Selector::All),
            "source" | "restricted_source_only" => Ok(Selector::RestrictedSourceOnly),
            other => Err(Error::InvalidInput(format!("unknown selector: {:?}", other))),
        }
    }
}

/// Row predicate evaluated by a store
///
/// Every `None` field matches everything. The builders below cover the
/// queries the queue issues; stores only need [`EntryFilter::matches`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    /// Required value of the `error` flag
    pub errored: Option<bool>,
    /// Selector visibility
    pub selector: Option<Selector>,
    /// Only rows never processed or processed strictly before this instant
    pub processed_before: Option<Timestamp>,
    /// Only rows of this subject type
    pub subject_type: Option<SubjectType>,
    /// Only rows of this subject id
    pub subject_id: Option<SubjectId>,
}

impl EntryFilter {
    /// Match every row
    pub fn any() -> Self {
        Self::default()
    }

    /// Undelivered, non-errored rows visible to `selector`
    pub fn pending(selector: Selector) -> Self {
        Self {
            errored: Some(false),
            selector: Some(selector),
            ..Self::default()
        }
    }

    /// Errored rows visible to `selector` whose cooldown ended before `cutoff`
    pub fn errored(selector: Selector, cutoff: Timestamp) -> Self {
        Self {
            errored: Some(true),
            selector: Some(selector),
            processed_before: Some(cutoff),
            ..Self::default()
        }
    }

    /// Every row describing one tracked entity
    pub fn subject(subject_type: SubjectType, subject_id: SubjectId) -> Self {
        Self {
            subject_type: Some(subject_type),
            subject_id: Some(subject_id),
            ..Self::default()
        }
    }

    /// Evaluate against one row
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(errored) = self.errored {
            if entry.error != errored {
                return false;
            }
        }
        if let Some(selector) = self.selector {
            if !selector.admits(entry) {
                return false;
            }
        }
        if let Some(cutoff) = self.processed_before {
            // processed_at IS NULL OR processed_at < cutoff
            if matches!(entry.processed_at, Some(at) if at >= cutoff) {
                return false;
            }
        }
        if let Some(subject_type) = &self.subject_type {
            if &entry.subject_type != subject_type {
                return false;
            }
        }
        if let Some(subject_id) = &self.subject_id {
            if &entry.subject_id != subject_id {
                return false;
            }
        }
        true
    }
}
