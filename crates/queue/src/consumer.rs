//! Queue consumer protocol
//!
//! Pollers share one log with no coordination beyond the store. Selection is
//! optimistic: two pollers may receive the same row, and whichever deletes
//! (or tags) it first completes it. Delivery is at-least-once.
//!
//! ## Stages
//!
//! ```text
//! next_row(All)                  -> process -> delete        (or tag `event`)
//! next_row(RestrictedSourceOnly) -> process -> tag `source` / delete
//! failure at any stage           -> record_error -> next_errored_row after cooldown
//! ```
//!
//! Errored rows are picked at random among the eligible ones so a single
//! poison row cannot starve the rest.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use distlog_core::{EntryFilter, LogEntry, Result, Selector, Tag, Timestamp};
use distlog_storage::LogStore;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::config::QueueConfig;

/// Polling consumer over a shared log
pub struct Queue {
    store: Arc<dyn LogStore>,
    config: QueueConfig,
    rng: Mutex<StdRng>,
}

impl fmt::Debug for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue").field("config", &self.config).finish()
    }
}

impl Queue {
    /// Consumer over `store`
    pub fn new(store: Arc<dyn LogStore>, config: QueueConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            store,
            config,
            rng: Mutex::new(rng),
        }
    }

    /// Settings in effect
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Underlying log
    pub fn store(&self) -> &Arc<dyn LogStore> {
        &self.store
    }

    /// Oldest pending row visible to `selector`
    ///
    /// Returns the same row on repeated calls until someone deletes, tags or
    /// fails it. Store faults are logged and reported as `None`.
    pub fn next_row(&self, selector: Selector) -> Option<LogEntry> {
        match self.store.find(&EntryFilter::pending(selector), 0) {
            Ok(found) => {
                if let Some(entry) = &found {
                    debug!(selector = %selector, entry_id = %entry.id, "Next row");
                }
                found
            }
            Err(e) => {
                error!(selector = %selector, error = %e, "Selecting next row failed");
                None
            }
        }
    }

    /// A random errored row visible to `selector` whose cooldown has passed
    ///
    /// With one eligible row that row is always returned. Store faults are
    /// logged and reported as `None`.
    pub fn next_errored_row(&self, selector: Selector) -> Option<LogEntry> {
        match self.pick_errored(selector) {
            Ok(found) => found,
            Err(e) => {
                error!(selector = %selector, error = %e, "Selecting errored row failed");
                None
            }
        }
    }

    fn pick_errored(&self, selector: Selector) -> Result<Option<LogEntry>> {
        let filter = EntryFilter::errored(selector, self.errored_cutoff());
        let candidates = self.store.count(&filter)?;
        if candidates == 0 {
            return Ok(None);
        }

        let offset = if candidates == 1 {
            0
        } else {
            self.rng.lock().gen_range(0..candidates)
        };
        debug!(selector = %selector, candidates, offset, "Picking errored row");

        match self.store.find(&filter, offset)? {
            Some(entry) => Ok(Some(entry)),
            // the candidate set shrank between count and fetch
            None => self.store.find(&filter, 0),
        }
    }

    /// Quarantine `entry`: set `error` and stamp `processed_at` with now
    pub fn record_error(&self, entry: &LogEntry) -> Result<()> {
        let now = Utc::now();
        self.store.mark_errored(entry.id, now)?;
        warn!(
            entry_id = %entry.id,
            subject_type = %entry.subject_type,
            subject_id = %entry.subject_id,
            "Recorded processing error"
        );
        Ok(())
    }

    /// Mark `entry` as handled by the stage owning `tag`
    pub fn append_tag(&self, entry: &LogEntry, tag: Tag) -> Result<()> {
        self.store.append_tag(entry.id, tag)?;
        debug!(entry_id = %entry.id, tag = %tag, "Tagged");
        Ok(())
    }

    /// Claim `entry` by deleting it; false if another poller got there first
    pub fn delete(&self, entry: &LogEntry) -> Result<bool> {
        let removed = self.store.delete(entry.id)?;
        debug!(entry_id = %entry.id, removed, "Deleted");
        Ok(removed)
    }

    /// Rows `next_row(selector)` would walk through
    pub fn pending_count(&self, selector: Selector) -> Result<usize> {
        self.store.count(&EntryFilter::pending(selector))
    }

    /// Quarantined rows visible to `selector`, including ones still cooling down
    pub fn errored_count(&self, selector: Selector) -> Result<usize> {
        self.store.count(&EntryFilter {
            errored: Some(true),
            selector: Some(selector),
            ..EntryFilter::default()
        })
    }

    /// Rows processed at or after this instant are still cooling down
    pub fn errored_cutoff(&self) -> Timestamp {
        ChronoDuration::from_std(self.config.error_cooldown)
            .ok()
            .and_then(|cooldown| Utc::now().checked_sub_signed(cooldown))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}
