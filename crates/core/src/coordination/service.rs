// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordination service
//!
//! Typed entry points over a [`CoordinationBackend`]. Callers name cells and
//! resources; the service builds the full keys and interprets raw values.
//! Backend failures are always returned as errors, never read as "not held".

use super::backend::{BackendError, CoordinationBackend};
use super::key::{self, FullKey, ResourcePath};
use super::types::{CellStatus, CounterValue, DegradedMode, LockToken};
use crate::cell::CellId;
use crate::config::CoordinationConfig;
use crate::id::{HolderId, IdGen, UuidIdGen};
use std::time::Duration;
use thiserror::Error;

/// Errors from coordination operations
#[derive(Debug, Error)]
pub enum CoordinationError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(
        "gave up on lock {key} after {attempts} attempts over {} (held by {holder})",
        humantime::format_duration(*.waited)
    )]
    LockTimeout {
        key: String,
        attempts: u32,
        waited: Duration,
        holder: String,
    },
    #[error("cell {0} is being deleted")]
    CellBeingDeleted(CellId),
    #[error("cell {cell} is busy ({status})")]
    CellBusy { cell: CellId, status: CellStatus },
    #[error("cell {0} is in read-delete-only mode")]
    ReadDeleteOnly(CellId),
    #[error("cell {cell} has unknown status code {code}")]
    UnknownStatus { cell: CellId, code: i64 },
}

/// Proof of holding an exclusive lock
///
/// Give it back with [`CoordinationService::release`]. Without a release the
/// lock stays held; the in-process backend never times locks out.
#[derive(Debug)]
#[must_use = "a held lock must be released"]
pub struct LockHandle {
    key: FullKey,
    token: LockToken,
}

impl LockHandle {
    pub fn key(&self) -> &FullKey {
        &self.key
    }

    pub fn holder(&self) -> &HolderId {
        &self.token.holder
    }

    pub fn token(&self) -> &LockToken {
        &self.token
    }
}

/// Coordination façade used by request handlers and background jobs
#[derive(Clone, Debug)]
pub struct CoordinationService<B, G = UuidIdGen> {
    backend: B,
    ids: G,
    config: CoordinationConfig,
}

impl<B: CoordinationBackend> CoordinationService<B, UuidIdGen> {
    pub fn new(backend: B, config: CoordinationConfig) -> Self {
        Self::with_id_gen(backend, config, UuidIdGen)
    }
}

impl<B: CoordinationBackend, G: IdGen> CoordinationService<B, G> {
    pub fn with_id_gen(backend: B, config: CoordinationConfig, ids: G) -> Self {
        Self {
            backend,
            ids,
            config,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // === Exclusive locks ===

    /// Single attempt; `None` when someone else holds the lock
    pub async fn try_lock(
        &self,
        cell: &CellId,
        resource: &ResourcePath,
        action: &str,
    ) -> Result<Option<LockHandle>, CoordinationError> {
        let key = key::lock_key(cell, resource);
        let token = LockToken::new(self.ids.next(), action);
        if self.backend.put_lock_if_absent(&key, token.clone()).await? {
            Ok(Some(LockHandle { key, token }))
        } else {
            Ok(None)
        }
    }

    /// Wait for the lock, polling every `lock_retry_interval` for at most
    /// `lock_retry_times` attempts
    pub async fn lock(
        &self,
        cell: &CellId,
        resource: &ResourcePath,
        action: &str,
    ) -> Result<LockHandle, CoordinationError> {
        let attempts = self.config.lock_retry_times.max(1);
        for attempt in 1..=attempts {
            if let Some(handle) = self.try_lock(cell, resource, action).await? {
                if attempt > 1 {
                    tracing::debug!(key = %handle.key, attempt, "lock acquired after waiting");
                }
                return Ok(handle);
            }
            if attempt < attempts {
                tokio::time::sleep(self.config.lock_retry_interval).await;
            }
        }

        let key = key::lock_key(cell, resource);
        let holder = match self.backend.get_lock(&key).await? {
            Some(token) => token.holder.to_string(),
            None => "nobody".to_string(),
        };
        let waited = self.config.lock_wait_budget();
        tracing::warn!(
            %key,
            attempts,
            waited_ms = waited.as_millis() as u64,
            %holder,
            "lock wait timed out"
        );
        Err(CoordinationError::LockTimeout {
            key: key.to_string(),
            attempts,
            waited,
            holder,
        })
    }

    /// Like [`lock`](Self::lock), but refuses cells that are being deleted
    ///
    /// The status is checked again once the lock is held, so a deletion that
    /// started while waiting is not missed.
    pub async fn lock_cell_resource(
        &self,
        cell: &CellId,
        resource: &ResourcePath,
        action: &str,
    ) -> Result<LockHandle, CoordinationError> {
        self.refuse_if_deleting(cell).await?;
        let handle = self.lock(cell, resource, action).await?;
        if let Err(e) = self.refuse_if_deleting(cell).await {
            self.release(handle).await?;
            return Err(e);
        }
        Ok(handle)
    }

    async fn refuse_if_deleting(&self, cell: &CellId) -> Result<(), CoordinationError> {
        if self.cell_status(cell).await? == CellStatus::BulkDeletion {
            return Err(CoordinationError::CellBeingDeleted(cell.clone()));
        }
        Ok(())
    }

    pub async fn lock_holder(
        &self,
        cell: &CellId,
        resource: &ResourcePath,
    ) -> Result<Option<LockToken>, CoordinationError> {
        Ok(self.backend.get_lock(&key::lock_key(cell, resource)).await?)
    }

    /// Release a held lock. Releasing twice is harmless.
    pub async fn release(&self, handle: LockHandle) -> Result<(), CoordinationError> {
        self.backend.release_lock(&handle.key).await?;
        Ok(())
    }

    /// Administrative release without a handle
    pub async fn release_key(
        &self,
        cell: &CellId,
        resource: &ResourcePath,
    ) -> Result<(), CoordinationError> {
        self.backend
            .release_lock(&key::lock_key(cell, resource))
            .await?;
        Ok(())
    }

    // === Reference-only tokens ===

    /// `true` iff this call created the token
    pub async fn claim_reference(
        &self,
        cell: &CellId,
        resource: &ResourcePath,
        value: &str,
    ) -> Result<bool, CoordinationError> {
        let key = key::reference_key(cell, resource);
        Ok(self.backend.put_reference_token_if_absent(&key, value).await?)
    }

    pub async fn reference(
        &self,
        cell: &CellId,
        resource: &ResourcePath,
    ) -> Result<Option<String>, CoordinationError> {
        let key = key::reference_key(cell, resource);
        Ok(self.backend.get_reference_token(&key).await?)
    }

    // === Usage counters ===

    pub async fn acquire_usage(
        &self,
        cell: &CellId,
        resource: &ResourcePath,
    ) -> Result<CounterValue, CoordinationError> {
        let count = self
            .backend
            .increment_count(&key::usage_key(cell, resource))
            .await?;
        Ok(CounterValue::from_stored(Some(count)))
    }

    /// Drop one usage. `Zero` means this was the last user; `Absent` means
    /// there was nothing to release.
    pub async fn release_usage(
        &self,
        cell: &CellId,
        resource: &ResourcePath,
    ) -> Result<CounterValue, CoordinationError> {
        let count = self
            .backend
            .decrement_count(&key::usage_key(cell, resource))
            .await?;
        Ok(CounterValue::from_stored(count))
    }

    pub async fn usage(
        &self,
        cell: &CellId,
        resource: &ResourcePath,
    ) -> Result<CounterValue, CoordinationError> {
        let count = self
            .backend
            .get_count(&key::usage_key(cell, resource))
            .await?;
        Ok(CounterValue::from_stored(count))
    }

    // === Cell status register ===

    /// Overwrite the cell's status. Not mutual exclusion: wrap in a cell lock
    /// when the transition must not race.
    pub async fn set_cell_status(
        &self,
        cell: &CellId,
        status: CellStatus,
    ) -> Result<(), CoordinationError> {
        self.backend
            .set_status(&key::status_key(cell), status.code())
            .await?;
        Ok(())
    }

    /// Current status; a cell with no register entry is `Normal`
    pub async fn cell_status(&self, cell: &CellId) -> Result<CellStatus, CoordinationError> {
        match self.backend.get_status(&key::status_key(cell)).await? {
            None => Ok(CellStatus::Normal),
            Some(code) => {
                CellStatus::from_code(code).ok_or_else(|| CoordinationError::UnknownStatus {
                    cell: cell.clone(),
                    code,
                })
            }
        }
    }

    pub async fn clear_cell_status(&self, cell: &CellId) -> Result<(), CoordinationError> {
        self.backend.delete_status(&key::status_key(cell)).await?;
        Ok(())
    }

    // === Degraded mode ===

    pub async fn degraded_mode(
        &self,
        cell: &CellId,
    ) -> Result<Option<DegradedMode>, CoordinationError> {
        let mode = self
            .backend
            .get_degraded_mode(&key::degraded_mode_key(cell))
            .await?;
        Ok(mode.as_deref().map(DegradedMode::parse))
    }

    // === Account lockout ===

    /// Lock the account out for the configured `account_lockout_ttl`
    pub async fn lock_account(&self, account: &str) -> Result<(), CoordinationError> {
        self.lock_account_for(account, self.config.account_lockout_ttl)
            .await
    }

    pub async fn lock_account_for(
        &self,
        account: &str,
        ttl: Duration,
    ) -> Result<(), CoordinationError> {
        let value = chrono::Utc::now().to_rfc3339();
        self.backend
            .set_account_lockout(&key::account_lockout_key(account), &value, ttl)
            .await?;
        Ok(())
    }

    /// The lockout record (its creation time), if the account is locked out
    pub async fn account_lockout(&self, account: &str) -> Result<Option<String>, CoordinationError> {
        Ok(self
            .backend
            .get_account_lockout(&key::account_lockout_key(account))
            .await?)
    }

    pub async fn is_account_locked(&self, account: &str) -> Result<bool, CoordinationError> {
        Ok(self.account_lockout(account).await?.is_some())
    }

    // === Unit-user locks ===

    /// `true` iff this call created the lock
    pub async fn claim_unit_user(
        &self,
        unit_user: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, CoordinationError> {
        Ok(self
            .backend
            .put_unit_user_lock_if_absent(&key::unit_user_lock_key(unit_user), value, ttl)
            .await?)
    }

    pub async fn unit_user_lock(&self, unit_user: &str) -> Result<Option<String>, CoordinationError> {
        Ok(self
            .backend
            .get_unit_user_lock(&key::unit_user_lock_key(unit_user))
            .await?)
    }

    // === Administration ===

    /// Drop every coordination entry (process-wide reset)
    pub async fn reset(&self) -> Result<(), CoordinationError> {
        tracing::warn!("resetting coordination state");
        self.backend.delete_all().await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
