//! Configuration structures for the price-timeline system.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Reconciliation configuration.
    #[serde(default)]
    pub merge: MergeConfig,
}

impl Config {
    /// Parse a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    fn check(&self) -> Result<()> {
        if self.merge.audit_output && !self.merge.validate_inputs {
            return Err(Error::config("audit_output requires validate_inputs"));
        }
        Ok(())
    }
}

/// How the engine walks existing records for each incoming record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Scan the whole existing collection per incoming record.
    #[default]
    LinearScan,
    /// Partition by key first, then scan only the matching partition.
    GroupedByKey,
}

/// Reconciliation engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Scan strategy.
    pub strategy: MergeStrategy,
    /// Reject records whose begin does not precede their end.
    pub validate_inputs: bool,
    /// Check the merged output for same-key overlaps and log them.
    pub audit_output: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            strategy: MergeStrategy::LinearScan,
            validate_inputs: true,
            audit_output: false,
        }
    }
}
