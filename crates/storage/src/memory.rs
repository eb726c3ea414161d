//! In-memory log store
//!
//! BTreeMap keyed by [`EntryId`] behind a `parking_lot::RwLock`. Ids and
//! timestamps are allocated together, so key order is `created_at` order and
//! range scans come back FIFO without a sort.
//!
//! # Thread Safety
//!
//! - Reads (`find`, `count`, `list`, `get`) share the read lock
//! - Appends allocate id + timestamp while holding the write lock
//! - Nothing is held across calls; selection stays optimistic
//!
//! The durable store layers a WAL on top of this type and uses the
//! `allocate` / `insert` / `restore` primitives directly.

use distlog_core::{
    EntryFilter, EntryId, Error, LogEntry, NewLogEntry, Result, Tag, Timestamp,
};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::clock::MonotonicClock;
use crate::traits::LogStore;

/// Volatile change log
#[derive(Debug)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<EntryId, LogEntry>>,
    /// Next id to hand out; ids start at 1
    next_id: AtomicU64,
    clock: MonotonicClock,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            clock: MonotonicClock::new(),
        }
    }

    /// Assign id and `created_at` without inserting
    ///
    /// Callers must serialize `allocate` + `insert` pairs themselves, or the
    /// map could briefly expose a newer row without an older one.
    pub fn allocate(&self, entry: NewLogEntry) -> LogEntry {
        let id = EntryId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let created_at = self.clock.tick();
        entry.into_entry(id, created_at)
    }

    /// Insert an already-allocated row
    pub fn insert(&self, entry: LogEntry) {
        self.entries.write().insert(entry.id, entry);
    }

    /// Insert a row read back from durable storage
    ///
    /// Advances the id counter and the clock past it so new appends keep
    /// ordering after recovery.
    pub fn restore(&self, entry: LogEntry) {
        let next = entry.id.as_u64() + 1;
        self.next_id.fetch_max(next, Ordering::SeqCst);
        self.clock.observe(entry.created_at);
        self.insert(entry);
    }

    /// Copy of every live row in `created_at` order
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.read().values().cloned().collect()
    }

    /// Whether a row exists
    pub fn contains(&self, id: EntryId) -> bool {
        self.entries.read().contains_key(&id)
    }

    /// Highest id handed out so far
    pub fn last_id(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst) - 1
    }

    fn with_entry_mut(&self, id: EntryId, f: impl FnOnce(&mut LogEntry)) -> Result<()> {
        let mut entries = self.entries.write();
        match entries.get_mut(&id) {
            Some(entry) => {
                f(entry);
                Ok(())
            }
            None => Err(Error::NotFound(id)),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LogStore for MemoryStore {
    fn append(&self, entry: NewLogEntry) -> Result<LogEntry> {
        let mut entries = self.entries.write();
        let entry = self.allocate(entry);
        entries.insert(entry.id, entry.clone());
        tracing::trace!(entry_id = %entry.id, subject_type = %entry.subject_type, "appended");
        Ok(entry)
    }

    fn get(&self, id: EntryId) -> Result<Option<LogEntry>> {
        Ok(self.entries.read().get(&id).cloned())
    }

    fn find(&self, filter: &EntryFilter, offset: usize) -> Result<Option<LogEntry>> {
        Ok(self
            .entries
            .read()
            .values()
            .filter(|entry| filter.matches(entry))
            .nth(offset)
            .cloned())
    }

    fn count(&self, filter: &EntryFilter) -> Result<usize> {
        Ok(self
            .entries
            .read()
            .values()
            .filter(|entry| filter.matches(entry))
            .count())
    }

    fn list(&self, filter: &EntryFilter) -> Result<Vec<LogEntry>> {
        Ok(self
            .entries
            .read()
            .values()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect())
    }

    fn append_tag(&self, id: EntryId, tag: Tag) -> Result<()> {
        self.with_entry_mut(id, |entry| entry.messages.push_tag(tag))
    }

    fn mark_errored(&self, id: EntryId, at: Timestamp) -> Result<()> {
        self.with_entry_mut(id, |entry| {
            entry.error = true;
            entry.processed_at = Some(at);
        })
    }

    fn delete(&self, id: EntryId) -> Result<bool> {
        Ok(self.entries.write().remove(&id).is_some())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.entries.read().len())
    }
}
