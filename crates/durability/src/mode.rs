//! Durability mode for WAL writes.
//!
//! Defines when appended records are fsynced to disk.

use serde::{Deserialize, Serialize};

/// Durability mode for WAL writes.
///
/// Controls when data is fsynced to disk and the trade-off between
/// performance and durability.
///
/// # Mode Comparison
///
/// | Mode | fsync | Use Case |
/// |------|-------|----------|
/// | None | never | Tests, throwaway logs |
/// | Batched | every N records or T ms | Production (balanced) |
/// | Strict | every record | Destroy captures that must precede row removal |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DurabilityMode {
    /// Records reach the OS but are never fsynced.
    None,

    /// fsync after every record.
    Strict,

    /// fsync every `batch_size` records OR every `interval_ms` milliseconds.
    ///
    /// The interval is checked on the write path; an idle log is synced on
    /// `flush` or drop.
    Batched {
        /// Maximum time between fsyncs in milliseconds
        interval_ms: u64,
        /// Maximum records between fsyncs
        batch_size: usize,
    },
}

impl DurabilityMode {
    /// Check if this mode requires immediate fsync on every record.
    pub fn requires_immediate_fsync(&self) -> bool {
        matches!(self, DurabilityMode::Strict)
    }

    /// Check if this mode ever fsyncs.
    pub fn syncs(&self) -> bool {
        !matches!(self, DurabilityMode::None)
    }

    /// Human-readable description of the mode.
    pub fn description(&self) -> &'static str {
        match self {
            DurabilityMode::None => "No fsync (fastest, recent records lost on crash)",
            DurabilityMode::Strict => "fsync per record (safest, slowest)",
            DurabilityMode::Batched { .. } => "Batched fsync (balanced speed/safety)",
        }
    }

    /// Batched mode with the default bounds (100ms / 1000 records).
    pub fn buffered_default() -> Self {
        DurabilityMode::Batched {
            interval_ms: 100,
            batch_size: 1000,
        }
    }
}

impl Default for DurabilityMode {
    fn default() -> Self {
        Self::buffered_default()
    }
}
