//! Capture layer for distlog
//!
//! This crate turns entity lifecycle notifications into log rows:
//! - ExclusionPolicy: per-type fields never logged
//! - CaptureToggle: enable flag plus nested, panic-safe suspension
//! - CaptureRegistry: tracked types and their settings
//! - Capture: the interceptor (`on_create`, `on_update`, `on_destroy`)
//! - Tracked / Record: what a persistence layer hands the interceptor
//! - EntityTable: in-memory persistence adapter driving the interceptor

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod interceptor;
pub mod policy;
pub mod registry;
pub mod table;
pub mod toggle;
pub mod tracked;

pub use interceptor::Capture;
pub use policy::{ExclusionPolicy, ALWAYS_EXCLUDED};
pub use registry::{CaptureRegistry, TrackedType};
pub use table::EntityTable;
pub use toggle::{CaptureToggle, SuspendGuard};
pub use tracked::{Record, Tracked};
