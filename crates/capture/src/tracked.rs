//! What the interceptor needs from a persistence layer

use distlog_core::{Attributes, SubjectId, SubjectType, Value};

/// An entity whose lifecycle is captured into the log
pub trait Tracked {
    /// Type discriminator written to `subject_type`
    fn subject_type(&self) -> SubjectType;

    /// Identity written to `subject_id`
    fn subject_id(&self) -> SubjectId;

    /// Full attribute snapshot as currently held
    fn attributes(&self) -> Attributes;

    /// Transient outbound message, if the caller set one
    fn pending_message(&self) -> Option<&str> {
        None
    }
}

/// Generic tracked entity: a typed, identified attribute map
///
/// This is the row type stored by [`EntityTable`](crate::table::EntityTable).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Type discriminator
    pub subject_type: SubjectType,
    /// Identity
    pub id: SubjectId,
    /// Attribute values
    pub attributes: Attributes,
    /// Outbound message for the next capture; never persisted
    pub pending_message: Option<String>,
}

impl Record {
    /// Empty record
    pub fn new(subject_type: impl Into<SubjectType>, id: impl Into<SubjectId>) -> Self {
        Self {
            subject_type: subject_type.into(),
            id: id.into(),
            attributes: Attributes::new(),
            pending_message: None,
        }
    }

    /// Set one attribute (builder form)
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Set one attribute
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(field.into(), value.into());
    }

    /// Read one attribute
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    /// Attach an outbound message (builder form)
    pub fn message(mut self, text: impl Into<String>) -> Self {
        self.pending_message = Some(text.into());
        self
    }
}

impl Tracked for Record {
    fn subject_type(&self) -> SubjectType {
        self.subject_type.clone()
    }

    fn subject_id(&self) -> SubjectId {
        self.id.clone()
    }

    fn attributes(&self) -> Attributes {
        self.attributes.clone()
    }

    fn pending_message(&self) -> Option<&str> {
        self.pending_message.as_deref()
    }
}
