//! Per-type exclusion policy
//!
//! Decides which attributes of a tracked entity never reach the log. The
//! excluded set is the union of:
//! - the entity's identity column (`primary_key`, default `id`)
//! - its type-discriminator column (`type_column`, default `type`)
//! - `id`, `created_at`, `updated_at`
//! - caller extras (`except`)
//!
//! A policy is immutable once registered with a [`CaptureRegistry`].
//!
//! [`CaptureRegistry`]: crate::registry::CaptureRegistry

use distlog_core::Attributes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Columns excluded for every tracked type
pub const ALWAYS_EXCLUDED: [&str; 3] = ["id", "created_at", "updated_at"];

/// Fields never written to a log entry for one subject type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionPolicy {
    /// Identity column
    pub primary_key: String,
    /// Type-discriminator column
    pub type_column: String,
    /// Extra fields named by the caller
    pub except: BTreeSet<String>,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self {
            primary_key: "id".to_string(),
            type_column: "type".to_string(),
            except: BTreeSet::new(),
        }
    }
}

impl ExclusionPolicy {
    /// Policy with only the default exclusions
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the identity column
    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = column.into();
        self
    }

    /// Override the type-discriminator column
    pub fn type_column(mut self, column: impl Into<String>) -> Self {
        self.type_column = column.into();
        self
    }

    /// Exclude one more field
    pub fn except(mut self, field: impl Into<String>) -> Self {
        self.except.insert(field.into());
        self
    }

    /// Exclude several more fields
    pub fn except_all<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.except.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Whether `field` is kept out of the log
    pub fn is_excluded(&self, field: &str) -> bool {
        field == self.primary_key
            || field == self.type_column
            || ALWAYS_EXCLUDED.contains(&field)
            || self.except.contains(field)
    }

    /// Full excluded set, sorted
    pub fn excluded(&self) -> BTreeSet<String> {
        let mut set: BTreeSet<String> = ALWAYS_EXCLUDED.iter().map(|s| s.to_string()).collect();
        set.insert(self.primary_key.clone());
        set.insert(self.type_column.clone());
        set.extend(self.except.iter().cloned());
        set
    }

    /// Columns from `columns` that would be logged
    pub fn capturable<'a, I>(&self, columns: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        columns
            .into_iter()
            .filter(|column| !self.is_excluded(column))
            .map(str::to_string)
            .collect()
    }

    /// Copy of `attributes` without excluded fields
    pub fn filter(&self, attributes: &Attributes) -> Attributes {
        attributes
            .iter()
            .filter(|(field, _)| !self.is_excluded(field))
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect()
    }
}
