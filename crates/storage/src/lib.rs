//! Storage layer for distlog
//!
//! This crate defines the store contract and the volatile backend:
//! - LogStore: trait every backend implements (append, find, tag, delete...)
//! - MemoryStore: BTreeMap-based log with RwLock
//! - MonotonicClock: strictly increasing `created_at` allocation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod memory;
pub mod traits;

pub use clock::MonotonicClock;
pub use memory::MemoryStore;
pub use traits::LogStore;
