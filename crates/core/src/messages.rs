//! The `messages` column: a whitespace-delimited token bag.
//!
//! Producers seed it with the entity's pending message; consumers append
//! stage tags (`event`, `source`) once they finish with a row. The text is
//! shared with processes that read the log table directly, so the encoding
//! stays plain text: every token is followed by a single space.
//!
//! Tag lookups are token containment, never structured parsing:
//!
//! ```text
//! ""                  no tags
//! "happiness "        free-form pending message, no tags
//! "event "            event stage complete
//! "event source "     both stages complete
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Stage tag written into `messages` by a consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    /// The event-processing stage has handled the row
    Event,
    /// The source-updating stage has handled the row
    Source,
    /// The row was handled as part of a batch (informational only)
    Batch,
}

impl Tag {
    /// Token text as it appears in `messages`
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Event => "event",
            Tag::Source => "source",
            Tag::Batch => "batch",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "event" => Ok(Tag::Event),
            "source" => Ok(Tag::Source),
            "batch" => Ok(Tag::Batch),
            other => Err(Error::InvalidInput(format!("unknown tag: {:?}", other))),
        }
    }
}

/// Contents of a log row's `messages` column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Messages(String);

impl Messages {
    /// Empty token bag
    pub fn new() -> Self {
        Messages(String::new())
    }

    /// Seed from an entity's pending message
    ///
    /// A missing pending message yields an empty bag. A present one is stored
    /// with its trailing separator so later tags stay separate tokens.
    pub fn from_pending(pending: Option<&str>) -> Self {
        match pending {
            Some(text) => Messages(format!("{} ", text)),
            None => Messages::new(),
        }
    }

    /// Wrap raw column text read from another process
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Messages(raw.into())
    }

    /// Raw column text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the column holds no text at all
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whitespace-separated tokens in write order
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split_whitespace()
    }

    /// Whether `tag` appears as a token
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tokens().any(|token| token == tag.as_str())
    }

    /// Append `tag` as a new token
    ///
    /// Appending never rewrites existing text. Re-tagging is a no-op so
    /// repeated deliveries of the same row do not grow the column.
    pub fn push_tag(&mut self, tag: Tag) {
        if self.has_tag(tag) {
            return;
        }
        if !self.0.is_empty() && !self.0.ends_with(char::is_whitespace) {
            self.0.push(' ');
        }
        self.0.push_str(tag.as_str());
        self.0.push(' ');
    }
}

impl fmt::Display for Messages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
