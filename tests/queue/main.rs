//! Queue Integration Tests
//!
//! Consumer protocol over a shared log: FIFO selection, the tag protocol
//! between pipeline stages, error quarantine with randomized retry, and
//! uncoordinated concurrent pollers.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test queue
//! cargo test --test queue errored::
//! ```

#[path = "../common/mod.rs"]
mod common;

mod errored;
mod tag_protocol;
