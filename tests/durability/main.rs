//! Durability Integration Tests
//!
//! The file-backed log through the facade: reopen after shutdown, torn
//! tails, compaction, and configuration-driven opening.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test durability
//! ```

#[path = "../common/mod.rs"]
mod common;

mod recovery;
