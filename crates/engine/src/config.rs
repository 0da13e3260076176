// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deletion tuning and top-level settings

use cg_core::config::read_config_file;
use cg_core::{ConfigError, CoordinationConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning for the bulk deletion orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeletionConfig {
    /// Binary record ids fetched per page
    pub batch_size: u64,
    /// Binary removals in flight at once within a page
    pub purge_concurrency: usize,
}

impl Default for DeletionConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            purge_concurrency: 1,
        }
    }
}

impl DeletionConfig {
    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_purge_concurrency(mut self, purge_concurrency: usize) -> Self {
        self.purge_concurrency = purge_concurrency;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid {
                field: "batch_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.purge_concurrency == 0 {
            return Err(ConfigError::Invalid {
                field: "purge_concurrency",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Everything a deployment configures, as one TOML document
///
/// ```toml
/// [coordination]
/// lock_retry_interval = "50ms"
/// lock_retry_times = 100
///
/// [deletion]
/// batch_size = 1000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub coordination: CoordinationConfig,
    pub deletion: DeletionConfig,
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(text)?;
        settings.coordination.validate()?;
        settings.deletion.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = read_config_file(path)?;
        let settings = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
