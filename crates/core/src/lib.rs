//! Core types for distlog
//!
//! This crate defines the data model shared by every layer:
//! - [`LogEntry`] / [`NewLogEntry`]: rows of the append-only change log
//! - [`Value`] / [`Attributes`]: captured attribute payloads
//! - [`Messages`] / [`Tag`]: the token bag consumers tag rows with
//! - [`Selector`] / [`EntryFilter`]: consumer visibility rules
//! - [`Error`]: the error type used across crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entry;
pub mod error;
pub mod messages;
pub mod selector;
pub mod types;
pub mod value;

pub use entry::{LogEntry, NewLogEntry};
pub use error::{Error, Result};
pub use messages::{Messages, Tag};
pub use selector::{EntryFilter, Selector};
pub use types::{Action, EntryId, SubjectId, SubjectType, Timestamp, RESTRICTED_SUBJECT_TYPE};
pub use value::{Attributes, Value};
