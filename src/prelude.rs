//! Convenient imports for distlog.
//!
//! ```ignore
//! use distlog::prelude::*;
//!
//! let log = DistLog::ephemeral()?;
//! log.track("User", ExclusionPolicy::new());
//! ```

// Main entry point
pub use crate::database::{DistLog, DistLogBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Producer side
pub use distlog_capture::{EntityTable, ExclusionPolicy, Record, Tracked};

// Consumer side
pub use distlog_core::{Action, LogEntry, Selector, Tag};

// Values
pub use distlog_core::{Attributes, Value};
