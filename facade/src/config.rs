//! Facade configuration with TOML file support.

use std::num::NonZeroUsize;
use std::path::Path;

use aztecs_client::ClientConfig;
use serde::{Deserialize, Serialize};

use crate::balances::BalanceAggregator;
use crate::FacadeError;

/// Configuration for the ledger facade.
///
/// Can be loaded from a TOML file via [`FacadeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FacadeConfig {
    /// Cap on simultaneously outstanding balance requests. Unset means one
    /// request per wallet, all at once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_concurrency: Option<usize>,

    /// Extra attempts at a failed post-mutation refresh before the view is
    /// marked stale.
    #[serde(default = "default_refresh_retries")]
    pub refresh_retries: u32,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Ledger service endpoint.
    #[serde(default)]
    pub client: ClientConfig,

    /// How block times are rendered.
    #[serde(default)]
    pub timestamp: TimestampConfig,
}

/// Rendering of block timestamps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampConfig {
    /// "local", "utc", or a fixed offset such as "+08:00".
    #[serde(default = "default_zone")]
    pub zone: String,

    /// `strftime`-style pattern.
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_refresh_retries() -> u32 {
    1
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_zone() -> String {
    "local".to_string()
}

fn default_pattern() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl FacadeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, FacadeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, FacadeError> {
        let config: Self = toml::from_str(s).map_err(|e| FacadeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, FacadeError> {
        toml::to_string_pretty(self).map_err(|e| FacadeError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), FacadeError> {
        if self.balance_concurrency == Some(0) {
            return Err(FacadeError::Config(
                "balance_concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The balance aggregator this configuration describes.
    pub fn aggregator(&self) -> BalanceAggregator {
        match self.balance_concurrency.and_then(NonZeroUsize::new) {
            Some(limit) => BalanceAggregator::bounded(limit),
            None => BalanceAggregator::unbounded(),
        }
    }
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            balance_concurrency: None,
            refresh_retries: default_refresh_retries(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            client: ClientConfig::default(),
            timestamp: TimestampConfig::default(),
        }
    }
}

impl Default for TimestampConfig {
    fn default() -> Self {
        Self {
            zone: default_zone(),
            pattern: default_pattern(),
        }
    }
}
