//! Capture Integration Tests
//!
//! Lifecycle capture through `EntityTable`: what gets logged for creates,
//! updates and destroys, exclusion filtering, and the capture toggle.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test capture
//! cargo test --test capture properties::
//! ```

#[path = "../common/mod.rs"]
mod common;

mod lifecycle;
mod properties;
mod toggle;
