//! Queue consumer for distlog
//!
//! This crate implements the polling side of the log:
//! - Queue: `next_row`, `next_errored_row`, `record_error`, tag and delete
//! - QueueConfig: error cooldown and reproducible errored-row picks
//!
//! Visibility between consumer stages follows the tag protocol encoded by
//! [`distlog_core::Selector`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod consumer;

pub use config::{QueueConfig, DEFAULT_ERROR_COOLDOWN};
pub use consumer::Queue;
