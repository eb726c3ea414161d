//! Consumer settings

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default wait before an errored row becomes eligible again
pub const DEFAULT_ERROR_COOLDOWN: Duration = Duration::from_secs(30 * 60);

/// Queue consumer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// How long an errored row stays hidden after `record_error`
    pub error_cooldown: Duration,
    /// Seed for the errored-row pick; `None` seeds from entropy
    pub rng_seed: Option<u64>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            error_cooldown: DEFAULT_ERROR_COOLDOWN,
            rng_seed: None,
        }
    }
}

impl QueueConfig {
    /// Set the errored-row cooldown
    pub fn error_cooldown(mut self, cooldown: Duration) -> Self {
        self.error_cooldown = cooldown;
        self
    }

    /// Make the errored-row pick reproducible
    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}
