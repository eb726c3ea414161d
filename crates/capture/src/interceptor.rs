//! Capture interceptor
//!
//! Turns lifecycle notifications from the persistence layer into log rows.
//!
//! | notification | payload | messages |
//! |--------------|---------|----------|
//! | `on_create` (after insert) | full filtered snapshot | pending message |
//! | `on_update` (after update) | filtered changed fields, skipped if empty | pending message |
//! | `on_destroy` (before delete) | full filtered snapshot | empty |
//!
//! Every notification returns `Ok(Some(entry))` when a row was appended,
//! `Ok(None)` when capture was skipped (untracked type, capture off, nothing
//! left after filtering), and `Err` only when the store append failed.

use distlog_core::{
    Action, Attributes, EntryFilter, Error, LogEntry, Messages, NewLogEntry, Result, SubjectType,
};
use distlog_storage::LogStore;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::policy::ExclusionPolicy;
use crate::registry::{CaptureRegistry, TrackedType};
use crate::tracked::Tracked;

/// Appends log rows for tracked entity mutations
#[derive(Clone)]
pub struct Capture {
    store: Arc<dyn LogStore>,
    registry: Arc<CaptureRegistry>,
    client_id: Option<String>,
}

impl fmt::Debug for Capture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capture")
            .field("client_id", &self.client_id)
            .field("tracked", &self.registry.types())
            .finish()
    }
}

impl Capture {
    /// Interceptor writing to `store` with an empty registry
    pub fn new(store: Arc<dyn LogStore>) -> Self {
        Self::with_registry(store, Arc::new(CaptureRegistry::new()))
    }

    /// Interceptor sharing an existing registry
    pub fn with_registry(store: Arc<dyn LogStore>, registry: Arc<CaptureRegistry>) -> Self {
        Self {
            store,
            registry,
            client_id: None,
        }
    }

    /// Stamp `client_id` on every appended row
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Process identifier stamped on rows
    pub fn client(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// Start tracking `subject_type`; a second call for the same type is ignored
    pub fn track(&self, subject_type: impl Into<SubjectType>, policy: ExclusionPolicy) -> bool {
        self.registry.register(subject_type, policy)
    }

    /// Tracked-type registry
    pub fn registry(&self) -> &Arc<CaptureRegistry> {
        &self.registry
    }

    /// Log store rows are appended to
    pub fn store(&self) -> &Arc<dyn LogStore> {
        &self.store
    }

    // =========================================================================
    // Lifecycle notifications
    // =========================================================================

    /// Entity was inserted
    pub fn on_create<T: Tracked + ?Sized>(&self, entity: &T) -> Result<Option<LogEntry>> {
        let Some(tracked) = self.active(entity) else {
            return Ok(None);
        };
        let changes = tracked.policy.filter(&entity.attributes());
        let messages = Messages::from_pending(entity.pending_message());
        self.append(entity, Action::Create, changes, messages).map(Some)
    }

    /// Entity was updated; `changed` holds the new values of fields that differ
    pub fn on_update<T: Tracked + ?Sized>(
        &self,
        entity: &T,
        changed: &Attributes,
    ) -> Result<Option<LogEntry>> {
        let Some(tracked) = self.active(entity) else {
            return Ok(None);
        };
        let changes = tracked.policy.filter(changed);
        if changes.is_empty() {
            debug!(
                subject_type = %entity.subject_type(),
                subject_id = %entity.subject_id(),
                "No capturable changes, skipping update"
            );
            return Ok(None);
        }
        let messages = Messages::from_pending(entity.pending_message());
        self.append(entity, Action::Update, changes, messages).map(Some)
    }

    /// Entity is about to be deleted; must run before the row is removed
    pub fn on_destroy<T: Tracked + ?Sized>(&self, entity: &T) -> Result<Option<LogEntry>> {
        let Some(tracked) = self.active(entity) else {
            return Ok(None);
        };
        let changes = tracked.policy.filter(&entity.attributes());
        self.append(entity, Action::Destroy, changes, Messages::new())
            .map(Some)
    }

    // =========================================================================
    // Toggle
    // =========================================================================

    /// Resume capture for `subject_type`
    pub fn enable(&self, subject_type: &SubjectType) -> Result<()> {
        self.tracked(subject_type)?.toggle.enable();
        debug!(subject_type = %subject_type, "Capture enabled");
        Ok(())
    }

    /// Stop capture for `subject_type` until re-enabled
    pub fn disable(&self, subject_type: &SubjectType) -> Result<()> {
        self.tracked(subject_type)?.toggle.disable();
        debug!(subject_type = %subject_type, "Capture disabled");
        Ok(())
    }

    /// Whether a mutation of `subject_type` right now would be captured
    pub fn is_enabled(&self, subject_type: &SubjectType) -> bool {
        self.registry
            .get(subject_type)
            .map(|tracked| tracked.toggle.is_active())
            .unwrap_or(false)
    }

    /// Run `f` with capture for `subject_type` suspended
    ///
    /// Capture resumes when `f` returns or unwinds. Untracked types are never
    /// captured, so `f` simply runs.
    pub fn without_capturing<R>(&self, subject_type: &SubjectType, f: impl FnOnce() -> R) -> R {
        match self.registry.get(subject_type) {
            Some(tracked) => tracked.toggle.without(f),
            None => f(),
        }
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// The snapshot a create or destroy of `entity` would log
    pub fn capturable_attributes<T: Tracked + ?Sized>(&self, entity: &T) -> Option<Attributes> {
        self.registry
            .get(&entity.subject_type())
            .map(|tracked| tracked.policy.filter(&entity.attributes()))
    }

    /// Live log rows describing `entity`, oldest first
    pub fn entries_for<T: Tracked + ?Sized>(&self, entity: &T) -> Result<Vec<LogEntry>> {
        self.store.list(&EntryFilter::subject(
            entity.subject_type(),
            entity.subject_id(),
        ))
    }

    fn tracked(&self, subject_type: &SubjectType) -> Result<Arc<TrackedType>> {
        self.registry
            .get(subject_type)
            .ok_or_else(|| Error::InvalidInput(format!("type not tracked: {}", subject_type)))
    }

    /// Settings for the entity's type when capture is currently on
    fn active<T: Tracked + ?Sized>(&self, entity: &T) -> Option<Arc<TrackedType>> {
        let subject_type = entity.subject_type();
        let Some(tracked) = self.registry.get(&subject_type) else {
            trace!(subject_type = %subject_type, "Type not tracked");
            return None;
        };
        if !tracked.toggle.is_active() {
            debug!(
                subject_type = %subject_type,
                subject_id = %entity.subject_id(),
                "Capture off, skipping"
            );
            return None;
        }
        Some(tracked)
    }

    fn append<T: Tracked + ?Sized>(
        &self,
        entity: &T,
        action: Action,
        changes: Attributes,
        messages: Messages,
    ) -> Result<LogEntry> {
        let entry = NewLogEntry::new(entity.subject_type(), entity.subject_id(), action)
            .changes(changes)
            .messages(messages)
            .client_id(self.client_id.clone());
        let entry = self.store.append(entry)?;
        debug!(
            entry_id = %entry.id,
            subject_type = %entry.subject_type,
            subject_id = %entry.subject_id,
            action = %entry.action,
            fields = entry.changes.len(),
            "Captured"
        );
        Ok(entry)
    }
}
