//! WAL-backed log store
//!
//! The live log is held in a [`MemoryStore`]; every mutation is written to
//! the WAL first and applied to memory second, under one writer lock:
//!
//! ```text
//! 1. lock writer
//! 2. validate (row exists, for tag/errored/delete)
//! 3. append WalRecord (fsync per DurabilityMode)   <- durability point
//! 4. apply to MemoryStore                          <- visibility point
//! 5. unlock
//! ```
//!
//! A crash between 3 and 4 loses nothing: recovery replays the record.
//! Reads never take the writer lock.
//!
//! One process owns a WalStore; concurrent pollers are threads sharing it.
//! Opening takes an exclusive advisory lock on [`LOCK_FILENAME`] and holds it
//! until the store is dropped, so a second opener (another process, or the
//! CLI pointed at a live log) fails instead of writing over the first.

use distlog_core::{EntryFilter, EntryId, Error, LogEntry, NewLogEntry, Result, Tag, Timestamp};
use distlog_storage::{LogStore, MemoryStore};
use fs2::FileExt;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::mode::DurabilityMode;
use crate::record::WalRecord;
use crate::wal::{Wal, WalRecovery};

/// WAL file name inside the database directory
pub const WAL_FILENAME: &str = "distlog.wal";

/// Lock file guarding the database directory
pub const LOCK_FILENAME: &str = "LOCK";

/// Summary of what `open` replayed
#[derive(Debug, Default, Clone)]
pub struct RecoveryStats {
    /// Records read from the WAL
    pub records_replayed: usize,
    /// Live rows after replay
    pub entries_restored: usize,
    /// Bytes dropped from an invalid tail
    pub truncated_bytes: u64,
}

/// Summary of a compaction pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionStats {
    /// WAL size before
    pub bytes_before: u64,
    /// WAL size after
    pub bytes_after: u64,
    /// Live rows written
    pub entries: usize,
}

/// Durable change log
#[derive(Debug)]
pub struct WalStore {
    dir: PathBuf,
    memory: MemoryStore,
    wal: Mutex<Wal>,
    recovery: RecoveryStats,
    /// Released on drop, after the WAL's final sync
    _lock: File,
}

impl WalStore {
    /// Open (or create) the store in `dir`
    ///
    /// Fails with [`Error::Storage`] while another `WalStore` holds `dir`.
    pub fn open(dir: impl AsRef<Path>, mode: DurabilityMode) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let lock = lock_dir(&dir)?;

        let (wal, recovered) = Wal::open(dir.join(WAL_FILENAME), mode)?;
        let memory = MemoryStore::new();
        let recovery = replay(&memory, recovered)?;

        info!(
            dir = %dir.display(),
            entries = recovery.entries_restored,
            records = recovery.records_replayed,
            mode = mode.description(),
            "Opened WAL store"
        );

        Ok(Self {
            dir,
            memory,
            wal: Mutex::new(wal),
            recovery,
            _lock: lock,
        })
    }

    /// What the last `open` replayed
    pub fn recovery(&self) -> &RecoveryStats {
        &self.recovery
    }

    /// Database directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Sync mode in effect
    pub fn durability_mode(&self) -> DurabilityMode {
        self.wal.lock().mode()
    }

    /// Rewrite the WAL with one `Append` per live row
    ///
    /// Tag, errored and delete records fold into the rows they touched, so
    /// the file shrinks to the size of the live log.
    pub fn compact(&self) -> Result<CompactionStats> {
        let mut wal = self.wal.lock();
        let bytes_before = wal.len();
        let records: Vec<WalRecord> = self
            .memory
            .snapshot()
            .into_iter()
            .map(WalRecord::Append)
            .collect();
        let bytes_after = wal.rewrite(&records)?;

        let stats = CompactionStats {
            bytes_before,
            bytes_after,
            entries: records.len(),
        };
        info!(
            bytes_before,
            bytes_after,
            entries = stats.entries,
            "Compacted WAL"
        );
        Ok(stats)
    }
}

fn lock_dir(dir: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(dir.join(LOCK_FILENAME))?;
    match file.try_lock_exclusive() {
        Ok(()) => Ok(file),
        Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => Err(
            Error::Storage(format!("database {} is already open elsewhere", dir.display())),
        ),
        Err(e) => Err(e.into()),
    }
}

fn replay(memory: &MemoryStore, recovered: WalRecovery) -> Result<RecoveryStats> {
    let records_replayed = recovered.records.len();
    for record in recovered.records {
        let kind = record.kind();
        let id = record.entry_id();
        let applied = match record {
            WalRecord::Append(entry) => {
                memory.restore(entry);
                Ok(())
            }
            WalRecord::Tag { id, tag } => memory.append_tag(id, tag),
            WalRecord::Errored { id, at } => memory.mark_errored(id, at),
            WalRecord::Delete { id } => memory.delete(id).map(|_| ()),
        };
        match applied {
            Ok(()) => {}
            // writers validate before logging, so this only follows manual edits
            Err(e) if e.is_not_found() => {
                debug!(entry_id = %id, kind, "Skipping WAL record for missing row");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(RecoveryStats {
        records_replayed,
        entries_restored: memory.len()?,
        truncated_bytes: recovered.truncated_bytes,
    })
}

impl LogStore for WalStore {
    fn append(&self, entry: NewLogEntry) -> Result<LogEntry> {
        let mut wal = self.wal.lock();
        let entry = self.memory.allocate(entry);
        wal.append(&WalRecord::Append(entry.clone()))?;
        self.memory.insert(entry.clone());
        debug!(entry_id = %entry.id, subject_type = %entry.subject_type, action = %entry.action, "Appended");
        Ok(entry)
    }

    fn get(&self, id: EntryId) -> Result<Option<LogEntry>> {
        self.memory.get(id)
    }

    fn find(&self, filter: &EntryFilter, offset: usize) -> Result<Option<LogEntry>> {
        self.memory.find(filter, offset)
    }

    fn count(&self, filter: &EntryFilter) -> Result<usize> {
        self.memory.count(filter)
    }

    fn list(&self, filter: &EntryFilter) -> Result<Vec<LogEntry>> {
        self.memory.list(filter)
    }

    fn append_tag(&self, id: EntryId, tag: Tag) -> Result<()> {
        let mut wal = self.wal.lock();
        if !self.memory.contains(id) {
            return Err(Error::NotFound(id));
        }
        wal.append(&WalRecord::Tag { id, tag })?;
        self.memory.append_tag(id, tag)
    }

    fn mark_errored(&self, id: EntryId, at: Timestamp) -> Result<()> {
        let mut wal = self.wal.lock();
        if !self.memory.contains(id) {
            return Err(Error::NotFound(id));
        }
        wal.append(&WalRecord::Errored { id, at })?;
        self.memory.mark_errored(id, at)
    }

    fn delete(&self, id: EntryId) -> Result<bool> {
        let mut wal = self.wal.lock();
        if !self.memory.contains(id) {
            return Ok(false);
        }
        wal.append(&WalRecord::Delete { id })?;
        self.memory.delete(id)
    }

    fn len(&self) -> Result<usize> {
        self.memory.len()
    }

    fn flush(&self) -> Result<()> {
        self.wal.lock().sync()
    }
}
