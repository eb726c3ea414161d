//! The store contract the capture and queue layers run against

use distlog_core::{EntryFilter, EntryId, LogEntry, NewLogEntry, Result, Tag, Timestamp};

/// Backing store for the shared change log
///
/// The store is the only synchronization point between producers and
/// pollers. Implementations must be safe to share across threads; they do
/// not need to provide locking across calls (selection is optimistic).
///
/// # Ordering
///
/// `append` assigns `id` and `created_at` such that both strictly increase
/// in append order. `find` and `list` return rows in that order.
pub trait LogStore: Send + Sync {
    /// Append a new row, returning it with id and timestamp assigned
    fn append(&self, entry: NewLogEntry) -> Result<LogEntry>;

    /// Fetch a row by id
    fn get(&self, id: EntryId) -> Result<Option<LogEntry>>;

    /// The `offset`-th matching row in `created_at` order
    fn find(&self, filter: &EntryFilter, offset: usize) -> Result<Option<LogEntry>>;

    /// Number of matching rows
    fn count(&self, filter: &EntryFilter) -> Result<usize>;

    /// All matching rows in `created_at` order
    fn list(&self, filter: &EntryFilter) -> Result<Vec<LogEntry>>;

    /// Append `tag` to a row's `messages`
    ///
    /// Returns `Error::NotFound` if the row is gone.
    fn append_tag(&self, id: EntryId, tag: Tag) -> Result<()>;

    /// Set `error = true` and `processed_at = at`
    ///
    /// Returns `Error::NotFound` if the row is gone.
    fn mark_errored(&self, id: EntryId, at: Timestamp) -> Result<()>;

    /// Remove a row (claim-by-delete). Returns whether it existed.
    fn delete(&self, id: EntryId) -> Result<bool>;

    /// Number of rows currently in the log
    fn len(&self) -> Result<usize>;

    /// Whether the log is empty
    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Force pending writes to stable storage
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}
