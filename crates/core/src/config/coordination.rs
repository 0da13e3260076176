// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordination service settings

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the in-process backend treats the TTL passed with account lockouts
/// and unit-user locks
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryPolicy {
    /// Accept and ignore the TTL; entries live until deleted or the process exits
    #[default]
    Ignore,
    /// Treat an entry as absent once its TTL has elapsed, evicting it on access
    Lazy,
}

/// Coordination service configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinationConfig {
    /// Pause between attempts when waiting for a held lock
    #[serde(with = "humantime_serde")]
    pub lock_retry_interval: Duration,
    /// Attempts made before a blocking lock gives up
    pub lock_retry_times: u32,
    /// How long an account stays locked out after repeated auth failures
    #[serde(with = "humantime_serde")]
    pub account_lockout_ttl: Duration,
    pub expiry: ExpiryPolicy,
}

impl Default for CoordinationConfig {
    fn default() -> Self {
        Self {
            lock_retry_interval: Duration::from_millis(50),
            lock_retry_times: 100,
            account_lockout_ttl: Duration::from_secs(60 * 60),
            expiry: ExpiryPolicy::Ignore,
        }
    }
}

impl CoordinationConfig {
    pub fn with_lock_retry(mut self, interval: Duration, times: u32) -> Self {
        self.lock_retry_interval = interval;
        self.lock_retry_times = times;
        self
    }

    pub fn with_account_lockout_ttl(mut self, ttl: Duration) -> Self {
        self.account_lockout_ttl = ttl;
        self
    }

    pub fn with_expiry(mut self, expiry: ExpiryPolicy) -> Self {
        self.expiry = expiry;
        self
    }

    /// Parse and validate from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lock_retry_times == 0 {
            return Err(ConfigError::Invalid {
                field: "lock_retry_times",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.account_lockout_ttl.is_zero() {
            return Err(ConfigError::Invalid {
                field: "account_lockout_ttl",
                reason: "must be non-zero".to_string(),
            });
        }
        Ok(())
    }

    /// Upper bound on how long a blocking lock call waits
    pub fn lock_wait_budget(&self) -> Duration {
        self.lock_retry_interval
            .saturating_mul(self.lock_retry_times.saturating_sub(1))
    }
}

#[cfg(test)]
#[path = "coordination_tests.rs"]
mod tests;
