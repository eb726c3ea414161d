//! Identifier and enum types shared by every distlog crate
//!
//! - [`EntryId`]: identity of a row in the change log
//! - [`SubjectId`] / [`SubjectType`]: the tracked entity a row describes
//! - [`Action`]: which lifecycle transition produced the row

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Wall-clock instant, always UTC.
pub type Timestamp = DateTime<Utc>;

/// Subject type whose rows go through the two-stage event/source pipeline.
pub const RESTRICTED_SUBJECT_TYPE: &str = "Source";

/// Identity of a log row
///
/// Allocated by the store from a monotonically increasing counter. Ids are
/// never reused, even after the row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(u64);

impl EntryId {
    /// Wrap a raw id
    pub const fn new(id: u64) -> Self {
        EntryId(id)
    }

    /// Get the raw id
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(EntryId)
            .map_err(|_| Error::InvalidInput(format!("invalid entry id: {:?}", s)))
    }
}

/// Identity of the tracked entity (uuid or numeric key rendered as text)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubjectId(String);

impl SubjectId {
    /// Create a subject id
    pub fn new(id: impl Into<String>) -> Self {
        SubjectId(id.into())
    }

    /// Borrow as str
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(s: &str) -> Self {
        SubjectId(s.to_string())
    }
}

impl From<String> for SubjectId {
    fn from(s: String) -> Self {
        SubjectId(s)
    }
}

impl From<u64> for SubjectId {
    fn from(n: u64) -> Self {
        SubjectId(n.to_string())
    }
}

/// Type discriminator of the tracked entity (e.g. `"User"`, `"Source"`)
///
/// Several entity types share one log; consumers branch on this field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubjectType(String);

impl SubjectType {
    /// Create a subject type
    pub fn new(name: impl Into<String>) -> Self {
        SubjectType(name.into())
    }

    /// Borrow as str
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether rows of this type are visible to the restricted source pipeline
    pub fn is_restricted(&self) -> bool {
        self.0 == RESTRICTED_SUBJECT_TYPE
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectType {
    fn from(s: &str) -> Self {
        SubjectType(s.to_string())
    }
}

impl From<String> for SubjectType {
    fn from(s: String) -> Self {
        SubjectType(s)
    }
}

/// Lifecycle transition that produced a log row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Entity was inserted
    Create,
    /// Entity was modified
    Update,
    /// Entity is being removed
    Destroy,
}

impl Action {
    /// Wire name as stored in the `action` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Action::Create),
            "update" => Ok(Action::Update),
            "destroy" => Ok(Action::Destroy),
            other => Err(Error::InvalidInput(format!("unknown action: {:?}", other))),
        }
    }
}
