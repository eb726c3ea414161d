//! Main entry point for distlog.
//!
//! This module provides the `DistLog` struct, which wires a log store to a
//! capture interceptor and a queue consumer.

use distlog_capture::{Capture, CaptureRegistry, EntityTable, ExclusionPolicy};
use distlog_core::{Selector, SubjectType};
use distlog_durability::{CompactionStats, DurabilityMode, RecoveryStats, WalStore};
use distlog_queue::{Queue, QueueConfig};
use distlog_storage::{LogStore, MemoryStore};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};

/// A change log with its producer and consumer sides.
///
/// Create one using [`DistLog::open`], [`DistLog::ephemeral`] or
/// [`DistLog::builder`].
///
/// # Example
///
/// ```ignore
/// use distlog::prelude::*;
///
/// let log = DistLog::builder()
///     .path("./log")
///     .client_id("web-1")
///     .track("User", ExclusionPolicy::new().except("username"))
///     .open()?;
///
/// let users = log.table("User");
/// users.create(attributes)?;
///
/// while let Some(entry) = log.queue.next_row(Selector::All) {
///     match handle(&entry) {
///         Ok(()) => { log.queue.delete(&entry)?; }
///         Err(_) => log.queue.record_error(&entry)?,
///     }
/// }
/// ```
pub struct DistLog {
    store: Arc<dyn LogStore>,
    /// Set when the log is file-backed
    wal: Option<Arc<WalStore>>,
    /// One shared table per subject type, created on first use
    tables: RwLock<HashMap<SubjectType, Arc<EntityTable>>>,

    /// Producer side: lifecycle notifications to log rows
    pub capture: Capture,

    /// Consumer side: polling, tagging, quarantine
    pub queue: Queue,
}

impl std::fmt::Debug for DistLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistLog")
            .field("path", &self.path())
            .field("capture", &self.capture)
            .field("queue", &self.queue)
            .finish()
    }
}

impl DistLog {
    /// Open a file-backed log in `path` with default settings.
    ///
    /// Uses batched durability.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().path(path).open()
    }

    /// Create a log with no disk I/O.
    ///
    /// Everything is lost when the log is dropped. Use this for unit tests
    /// and single-process pipelines that tolerate loss.
    pub fn ephemeral() -> Result<Self> {
        Self::builder().ephemeral().open()
    }

    /// Create a builder for log configuration.
    pub fn builder() -> DistLogBuilder {
        DistLogBuilder::new()
    }

    /// Open the log at `path` using a parsed [`Config`].
    pub fn open_with_config(path: impl AsRef<Path>, config: &Config) -> Result<Self> {
        Self::builder().path(path).config(config)?.open()
    }

    /// Start tracking a subject type; a second call for the same type is ignored.
    pub fn track(&self, subject_type: impl Into<SubjectType>, policy: ExclusionPolicy) -> bool {
        self.capture.track(subject_type, policy)
    }

    /// In-memory entity table for `subject_type`, wired to this log's capture.
    ///
    /// Every call for the same type returns the same table, so rows and
    /// assigned ids are shared between handles.
    pub fn table(&self, subject_type: impl Into<SubjectType>) -> Arc<EntityTable> {
        let subject_type = subject_type.into();
        if let Some(table) = self.tables.read().get(&subject_type) {
            return Arc::clone(table);
        }
        let mut tables = self.tables.write();
        Arc::clone(tables.entry(subject_type.clone()).or_insert_with(|| {
            Arc::new(EntityTable::new(subject_type, self.capture.clone()))
        }))
    }

    /// The underlying log store.
    pub fn store(&self) -> &Arc<dyn LogStore> {
        &self.store
    }

    /// Force pending WAL records to disk.
    pub fn flush(&self) -> Result<()> {
        self.store.flush().map_err(Into::into)
    }

    /// Rewrite the WAL down to the live rows.
    ///
    /// Fails for ephemeral logs.
    pub fn compact(&self) -> Result<CompactionStats> {
        match &self.wal {
            Some(wal) => wal.compact().map_err(Into::into),
            None => Err(Error::Config("ephemeral log has no WAL to compact".to_string())),
        }
    }

    /// Database directory, `None` for ephemeral logs.
    pub fn path(&self) -> Option<&Path> {
        self.wal.as_ref().map(|wal| wal.dir())
    }

    /// WAL sync mode, `None` for ephemeral logs.
    pub fn durability_mode(&self) -> Option<DurabilityMode> {
        self.wal.as_ref().map(|wal| wal.durability_mode())
    }

    /// What opening the log replayed, `None` for ephemeral logs.
    pub fn recovery(&self) -> Option<&RecoveryStats> {
        self.wal.as_ref().map(|wal| wal.recovery())
    }

    /// Check if this log has no disk files.
    pub fn is_ephemeral(&self) -> bool {
        self.wal.is_none()
    }

    /// Row counts for operators.
    pub fn stats(&self) -> Result<LogStats> {
        Ok(LogStats {
            entries: self.store.len()?,
            pending_all: self.queue.pending_count(Selector::All)?,
            pending_source: self.queue.pending_count(Selector::RestrictedSourceOnly)?,
            errored_all: self.queue.errored_count(Selector::All)?,
            errored_source: self.queue.errored_count(Selector::RestrictedSourceOnly)?,
        })
    }
}

/// Log row counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogStats {
    /// Live rows
    pub entries: usize,
    /// Rows `next_row(All)` would walk through
    pub pending_all: usize,
    /// Rows `next_row(RestrictedSourceOnly)` would walk through
    pub pending_source: usize,
    /// Quarantined rows visible to `All`
    pub errored_all: usize,
    /// Quarantined rows visible to `RestrictedSourceOnly`
    pub errored_source: usize,
}

/// Builder for log configuration.
///
/// # Example
///
/// ```ignore
/// // Production: disk-backed, fsync batched
/// let log = DistLog::builder().path("./log").buffered().open()?;
///
/// // Audit trail: fsync every record
/// let log = DistLog::builder().path("./log").strict().open()?;
///
/// // Unit testing: no disk at all
/// let log = DistLog::builder().ephemeral().rng_seed(7).open()?;
/// ```
#[derive(Debug, Clone)]
pub struct DistLogBuilder {
    path: Option<PathBuf>,
    ephemeral: bool,
    durability: DurabilityMode,
    client_id: Option<String>,
    queue: QueueConfig,
    tracked: Vec<(SubjectType, ExclusionPolicy)>,
}

impl DistLogBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            path: None,
            ephemeral: false,
            durability: DurabilityMode::default(),
            client_id: None,
            queue: QueueConfig::default(),
            tracked: Vec::new(),
        }
    }

    /// Set the database directory path.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Keep the log in memory only; any path is ignored.
    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    /// Never fsync the WAL (files are still written).
    pub fn no_durability(mut self) -> Self {
        self.durability = DurabilityMode::None;
        self
    }

    /// Fsync the WAL after every record.
    pub fn strict(mut self) -> Self {
        self.durability = DurabilityMode::Strict;
        self
    }

    /// Batched fsync with default bounds (default).
    pub fn buffered(mut self) -> Self {
        self.durability = DurabilityMode::buffered_default();
        self
    }

    /// Batched fsync with custom bounds.
    ///
    /// # Arguments
    ///
    /// * `interval_ms` - Maximum time between fsyncs
    /// * `batch_size` - Maximum records between fsyncs
    pub fn buffered_with(mut self, interval_ms: u64, batch_size: usize) -> Self {
        self.durability = DurabilityMode::Batched {
            interval_ms,
            batch_size,
        };
        self
    }

    /// Identifier stamped on every captured row.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// How long errored rows stay hidden from `next_errored_row`.
    pub fn error_cooldown(mut self, cooldown: Duration) -> Self {
        self.queue.error_cooldown = cooldown;
        self
    }

    /// Make the errored-row pick reproducible.
    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.queue.rng_seed = Some(seed);
        self
    }

    /// Track a subject type from the start.
    pub fn track(mut self, subject_type: impl Into<SubjectType>, policy: ExclusionPolicy) -> Self {
        self.tracked.push((subject_type.into(), policy));
        self
    }

    /// Apply every setting from a parsed [`Config`].
    pub fn config(mut self, config: &Config) -> Result<Self> {
        self.durability = config.durability.to_mode()?;
        self.queue = config.queue.to_queue_config();
        if let Some(client_id) = &config.client_id {
            self.client_id = Some(client_id.clone());
        }
        for (subject_type, policy) in &config.tracked {
            self.tracked
                .push((SubjectType::new(subject_type.as_str()), policy.clone()));
        }
        Ok(self)
    }

    /// Open the log.
    pub fn open(self) -> Result<DistLog> {
        let wal = if self.ephemeral {
            None
        } else {
            let path = self.path.as_ref().ok_or_else(|| {
                Error::Config("database path not set; use .path() or .ephemeral()".to_string())
            })?;
            Some(Arc::new(WalStore::open(path, self.durability)?))
        };
        let store: Arc<dyn LogStore> = match &wal {
            Some(wal) => wal.clone(),
            None => Arc::new(MemoryStore::new()),
        };

        let registry = Arc::new(CaptureRegistry::new());
        for (subject_type, policy) in self.tracked {
            registry.register(subject_type, policy);
        }
        let mut capture = Capture::with_registry(store.clone(), registry);
        if let Some(client_id) = self.client_id {
            capture = capture.client_id(client_id);
        }
        let queue = Queue::new(store.clone(), self.queue);

        info!(
            ephemeral = wal.is_none(),
            client_id = capture.client().unwrap_or("-"),
            "Opened distlog"
        );

        Ok(DistLog {
            store,
            wal,
            tables: RwLock::new(HashMap::new()),
            capture,
            queue,
        })
    }
}

impl Default for DistLogBuilder {
    fn default() -> Self {
        Self::new()
    }
}
