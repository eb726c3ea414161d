//! TOML configuration.
//!
//! ```toml
//! client_id = "web-1"
//!
//! [durability]
//! mode = "strict"            # none | strict | batched
//! interval_ms = 100
//! batch_size = 1000
//!
//! [queue]
//! error_cooldown_secs = 1800
//! rng_seed = 7
//!
//! [tracked.User]
//! primary_key = "id"
//! type_column = "type"
//! except = ["username"]
//! ```
//!
//! Every section and key is optional; missing ones take the builder
//! defaults.

use distlog_capture::ExclusionPolicy;
use distlog_durability::DurabilityMode;
use distlog_queue::{QueueConfig, DEFAULT_ERROR_COOLDOWN};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Whole configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identifier stamped on captured rows
    pub client_id: Option<String>,
    /// WAL sync settings
    pub durability: DurabilityConfig,
    /// Consumer settings
    pub queue: QueueSection,
    /// Tracked types and their exclusion policies
    pub tracked: BTreeMap<String, ExclusionPolicy>,
}

/// `[durability]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurabilityConfig {
    /// `none`, `strict` or `batched`
    pub mode: String,
    /// Batched: longest time between fsyncs
    pub interval_ms: u64,
    /// Batched: most records between fsyncs
    pub batch_size: usize,
}

impl Default for DurabilityConfig {
    fn default() -> Self {
        Self {
            mode: "batched".to_string(),
            interval_ms: 100,
            batch_size: 1000,
        }
    }
}

impl DurabilityConfig {
    /// Resolve to a [`DurabilityMode`]
    pub fn to_mode(&self) -> Result<DurabilityMode> {
        match self.mode.as_str() {
            "none" => Ok(DurabilityMode::None),
            "strict" => Ok(DurabilityMode::Strict),
            "batched" => Ok(DurabilityMode::Batched {
                interval_ms: self.interval_ms,
                batch_size: self.batch_size,
            }),
            other => Err(Error::Config(format!(
                "unknown durability mode {:?} (expected none, strict or batched)",
                other
            ))),
        }
    }
}

/// `[queue]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueSection {
    /// Seconds an errored row stays hidden
    pub error_cooldown_secs: u64,
    /// Seed for the errored-row pick
    pub rng_seed: Option<u64>,
}

impl Default for QueueSection {
    fn default() -> Self {
        Self {
            error_cooldown_secs: DEFAULT_ERROR_COOLDOWN.as_secs(),
            rng_seed: None,
        }
    }
}

impl QueueSection {
    /// Resolve to a [`QueueConfig`]
    pub fn to_queue_config(&self) -> QueueConfig {
        QueueConfig {
            error_cooldown: Duration::from_secs(self.error_cooldown_secs),
            rng_seed: self.rng_seed,
        }
    }
}

impl Config {
    /// Parse TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.durability.to_mode()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }
}
