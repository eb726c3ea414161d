//! WAL file operations
//!
//! Opening a WAL reads every valid frame, truncates a torn or corrupt tail,
//! and positions the writer at the end. Appends are framed by
//! [`encode_record`] and synced according to the [`DurabilityMode`].

use distlog_core::{Error, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::encoding::{decode_record, encode_record, Decoded};
use crate::mode::DurabilityMode;
use crate::record::WalRecord;

/// What recovery found in an existing WAL file
#[derive(Debug, Default, Clone)]
pub struct WalRecovery {
    /// Valid records in file order
    pub records: Vec<WalRecord>,
    /// Length of the valid prefix
    pub valid_bytes: u64,
    /// Bytes cut from the tail (torn write or corruption)
    pub truncated_bytes: u64,
    /// Why the tail was cut, if it was
    pub truncation_reason: Option<String>,
}

/// I/O failure forced on the next append
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub(crate) enum Fault {
    /// Write only this many bytes of the frame, then fail
    ShortWrite(usize),
    /// Write the whole frame, then fail the fsync
    Sync,
}

/// Append-only WAL file
///
/// A failed append leaves the file exactly as long as it was before the
/// call, so later records never land behind a torn or unacknowledged frame.
#[derive(Debug)]
pub struct Wal {
    path: PathBuf,
    file: File,
    mode: DurabilityMode,
    /// Records written since the last fsync
    pending: usize,
    last_sync: Instant,
    /// Length of the acknowledged prefix
    len: u64,
    /// Set when a failed append could not be cut back off the file
    poisoned: bool,
    #[cfg(test)]
    fault: Option<Fault>,
}

impl Wal {
    /// Open (or create) the WAL at `path` and recover its contents
    pub fn open(path: impl AsRef<Path>, mode: DurabilityMode) -> Result<(Self, WalRecovery)> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        let recovery = scan(&buf);

        if recovery.truncated_bytes > 0 {
            warn!(
                path = %path.display(),
                truncated_bytes = recovery.truncated_bytes,
                reason = recovery.truncation_reason.as_deref().unwrap_or("unknown"),
                "Truncating invalid WAL tail"
            );
            file.set_len(recovery.valid_bytes)?;
            file.sync_all()?;
        }
        file.seek(SeekFrom::End(0))?;

        info!(
            path = %path.display(),
            records = recovery.records.len(),
            bytes = recovery.valid_bytes,
            "Opened WAL"
        );

        let wal = Wal {
            path,
            file,
            mode,
            pending: 0,
            last_sync: Instant::now(),
            len: recovery.valid_bytes,
            poisoned: false,
            #[cfg(test)]
            fault: None,
        };
        Ok((wal, recovery))
    }

    /// Append one record, syncing if the mode asks for it
    ///
    /// On error the frame is cut back off the file before returning, whether
    /// the write itself or the fsync failed.
    pub fn append(&mut self, record: &WalRecord) -> Result<()> {
        if self.poisoned {
            return Err(Error::Storage(format!(
                "WAL {} holds an unrecoverable partial write; reopen the store",
                self.path.display()
            )));
        }
        let frame = encode_record(record)?;
        let start = self.len;

        if let Err(e) = self.write_frame(&frame) {
            self.rollback(start);
            return Err(e.into());
        }
        self.len += frame.len() as u64;
        self.pending += 1;

        if let Err(e) = self.sync_if_due() {
            self.pending -= 1;
            self.rollback(start);
            return Err(e);
        }
        Ok(())
    }

    fn sync_if_due(&mut self) -> Result<()> {
        match self.mode {
            DurabilityMode::None => Ok(()),
            DurabilityMode::Strict => self.sync(),
            DurabilityMode::Batched {
                interval_ms,
                batch_size,
            } => {
                if self.pending >= batch_size
                    || self.last_sync.elapsed() >= Duration::from_millis(interval_ms)
                {
                    self.sync()
                } else {
                    Ok(())
                }
            }
        }
    }

    fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        #[cfg(test)]
        {
            if let Some(Fault::ShortWrite(n)) = self.fault {
                self.fault = None;
                self.file.write_all(&frame[..n.min(frame.len())])?;
                return Err(io::Error::new(io::ErrorKind::Other, "short write"));
            }
        }
        self.file.write_all(frame)
    }

    fn sync_data(&mut self) -> io::Result<()> {
        #[cfg(test)]
        {
            if let Some(Fault::Sync) = self.fault {
                self.fault = None;
                return Err(io::Error::new(io::ErrorKind::Other, "fsync failed"));
            }
        }
        self.file.sync_data()
    }

    /// Cut the file back to `len` after a failed append
    fn rollback(&mut self, len: u64) {
        match self.truncate_to(len) {
            Ok(()) => {
                self.len = len;
                warn!(path = %self.path.display(), len, "Rolled back failed WAL append");
            }
            Err(e) => {
                self.poisoned = true;
                error!(
                    path = %self.path.display(),
                    len,
                    error = %e,
                    "WAL rollback failed; refusing further appends"
                );
            }
        }
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.file.set_len(len)?;
        self.file.seek(SeekFrom::End(0))?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn inject(&mut self, fault: Fault) {
        self.fault = Some(fault);
    }

    /// fsync any pending records
    pub fn sync(&mut self) -> Result<()> {
        if self.pending == 0 {
            return Ok(());
        }
        self.sync_data()?;
        debug!(records = self.pending, "WAL synced");
        self.pending = 0;
        self.last_sync = Instant::now();
        Ok(())
    }

    /// Replace the file contents with `records`
    ///
    /// Writes a sibling temp file, syncs it, then renames it over the WAL so
    /// a crash leaves either the old or the new file intact.
    pub fn rewrite(&mut self, records: &[WalRecord]) -> Result<u64> {
        let tmp_path = self.path.with_extension("wal.compact");
        let mut len = 0u64;
        {
            let mut tmp = File::create(&tmp_path)?;
            for record in records {
                let frame = encode_record(record)?;
                tmp.write_all(&frame)?;
                len += frame.len() as u64;
            }
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        let mut file = OpenOptions::new().read(true).write(true).open(&self.path)?;
        file.seek(SeekFrom::End(0))?;
        self.file = file;
        self.len = len;
        self.pending = 0;
        self.last_sync = Instant::now();
        self.poisoned = false;
        Ok(len)
    }

    /// WAL file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current file length in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the file holds no records
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sync mode in effect
    pub fn mode(&self) -> DurabilityMode {
        self.mode
    }
}

impl Drop for Wal {
    fn drop(&mut self) {
        if self.mode.syncs() {
            if let Err(e) = self.sync() {
                warn!(path = %self.path.display(), error = %e, "WAL sync on close failed");
            }
        }
    }
}

/// Decode frames until the first invalid one
fn scan(buf: &[u8]) -> WalRecovery {
    let mut recovery = WalRecovery::default();
    let mut offset = 0usize;

    while offset < buf.len() {
        match decode_record(&buf[offset..]) {
            Decoded::Record(record, used) => {
                recovery.records.push(record);
                offset += used;
            }
            Decoded::Incomplete => {
                recovery.truncation_reason = Some(format!("incomplete frame at {}", offset));
                break;
            }
            Decoded::Corrupt(reason) => {
                recovery.truncation_reason = Some(format!("{} at {}", reason, offset));
                break;
            }
        }
    }

    recovery.valid_bytes = offset as u64;
    recovery.truncated_bytes = (buf.len() - offset) as u64;
    recovery
}
