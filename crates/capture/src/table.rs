//! Reference persistence adapter
//!
//! `EntityTable` is an in-memory table for one subject type that drives the
//! interceptor the way an ORM's lifecycle hooks would:
//!
//! ```text
//! insert  -> write row -> on_create         (undo row on capture failure)
//! save    -> diff      -> write row -> on_update (undo on capture failure)
//! destroy -> on_destroy -> remove row       (row kept on capture failure)
//! ```
//!
//! The table write lock is held across the write and its capture, so a
//! destroy's log row is visible strictly before the entity disappears.

use chrono::Utc;
use distlog_core::{Attributes, Error, Result, SubjectId, SubjectType, Value};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::interceptor::Capture;
use crate::tracked::Record;

const CREATED_AT: &str = "created_at";
const UPDATED_AT: &str = "updated_at";

/// In-memory rows of one tracked type
#[derive(Debug)]
pub struct EntityTable {
    subject_type: SubjectType,
    capture: Capture,
    rows: RwLock<BTreeMap<SubjectId, Attributes>>,
    next_id: AtomicU64,
}

impl EntityTable {
    /// Empty table whose mutations go through `capture`
    pub fn new(subject_type: impl Into<SubjectType>, capture: Capture) -> Self {
        Self {
            subject_type: subject_type.into(),
            capture,
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Type stored in this table
    pub fn subject_type(&self) -> &SubjectType {
        &self.subject_type
    }

    /// Interceptor driven by this table
    pub fn capture(&self) -> &Capture {
        &self.capture
    }

    /// Insert a row with the next numeric id
    pub fn create(&self, attributes: Attributes) -> Result<Record> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut record = Record::new(self.subject_type.clone(), id);
        record.attributes = attributes;
        self.insert(record)
    }

    /// Insert `record`, failing if its id is taken
    pub fn insert(&self, mut record: Record) -> Result<Record> {
        self.check_type(&record)?;
        let mut rows = self.rows.write();
        if rows.contains_key(&record.id) {
            return Err(Error::InvalidInput(format!(
                "{} {} already exists",
                self.subject_type, record.id
            )));
        }

        let now = Value::String(Utc::now().to_rfc3339());
        record.set(CREATED_AT, now.clone());
        record.set(UPDATED_AT, now);
        rows.insert(record.id.clone(), record.attributes.clone());

        if let Err(e) = self.capture.on_create(&record) {
            rows.remove(&record.id);
            return Err(e);
        }
        Ok(record)
    }

    /// Merge `record` into the stored row and capture what changed
    ///
    /// Only fields whose value differs from the stored one count as changed;
    /// `updated_at` moves only when something did.
    pub fn save(&self, record: Record) -> Result<Record> {
        self.check_type(&record)?;
        let mut rows = self.rows.write();
        let Some(stored) = rows.get(&record.id).cloned() else {
            return Err(Error::InvalidInput(format!(
                "{} {} does not exist",
                self.subject_type, record.id
            )));
        };

        let mut changed: Attributes = record
            .attributes
            .iter()
            .filter(|(field, value)| stored.get(*field) != Some(*value))
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect();
        changed.remove(CREATED_AT);

        let mut merged = stored.clone();
        merged.extend(changed.clone());
        if !changed.is_empty() {
            let now = Value::String(Utc::now().to_rfc3339());
            merged.insert(UPDATED_AT.to_string(), now.clone());
            changed.insert(UPDATED_AT.to_string(), now);
        }
        rows.insert(record.id.clone(), merged.clone());

        let saved = Record {
            attributes: merged,
            ..record
        };
        if changed.is_empty() {
            debug!(subject_type = %self.subject_type, subject_id = %saved.id, "Nothing changed");
            return Ok(saved);
        }
        if let Err(e) = self.capture.on_update(&saved, &changed) {
            rows.insert(saved.id.clone(), stored);
            return Err(e);
        }
        Ok(saved)
    }

    /// Remove the row, capturing it first; returns false if absent
    pub fn destroy(&self, id: &SubjectId) -> Result<bool> {
        let mut rows = self.rows.write();
        let Some(attributes) = rows.get(id).cloned() else {
            return Ok(false);
        };
        let record = Record {
            subject_type: self.subject_type.clone(),
            id: id.clone(),
            attributes,
            pending_message: None,
        };
        self.capture.on_destroy(&record)?;
        rows.remove(id);
        Ok(true)
    }

    /// Stored row
    pub fn find(&self, id: &SubjectId) -> Option<Record> {
        self.rows.read().get(id).map(|attributes| Record {
            subject_type: self.subject_type.clone(),
            id: id.clone(),
            attributes: attributes.clone(),
            pending_message: None,
        })
    }

    /// `save` with capture suspended for this type
    pub fn save_without_capturing(&self, record: Record) -> Result<Record> {
        self.capture
            .without_capturing(&self.subject_type, || self.save(record))
    }

    /// `insert` with capture suspended for this type
    pub fn create_without_capturing(&self, record: Record) -> Result<Record> {
        self.capture
            .without_capturing(&self.subject_type, || self.insert(record))
    }

    /// Number of stored rows
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    fn check_type(&self, record: &Record) -> Result<()> {
        if record.subject_type != self.subject_type {
            return Err(Error::InvalidInput(format!(
                "{} record saved into {} table",
                record.subject_type, self.subject_type
            )));
        }
        Ok(())
    }
}
