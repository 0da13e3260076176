// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pluggable storage for coordination entries
//!
//! All mutual exclusion rests on the `*_if_absent` operations: a conforming
//! backend performs each of them as one indivisible check-and-set.

use super::key::FullKey;
use super::types::LockToken;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from a coordination backend
///
/// Contention is not an error: if-absent calls report it as `Ok(false)`.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("coordination backend unavailable: {0}")]
    Unavailable(String),
    #[error("entry at {key} is not a {expected}")]
    EntryKindMismatch { key: String, expected: &'static str },
}

/// Keyed storage behind the coordination service
#[async_trait]
pub trait CoordinationBackend: Clone + Send + Sync + 'static {
    /// Current holder of the exclusive lock at `key`
    async fn get_lock(&self, key: &FullKey) -> Result<Option<LockToken>, BackendError>;

    /// Create the lock entry unless one exists; `true` iff this call created it
    async fn put_lock_if_absent(
        &self,
        key: &FullKey,
        token: LockToken,
    ) -> Result<bool, BackendError>;

    /// Remove the lock entry; absent keys are fine
    async fn release_lock(&self, key: &FullKey) -> Result<(), BackendError>;

    /// Clear every entry of every category
    async fn delete_all(&self) -> Result<(), BackendError>;

    async fn get_reference_token(&self, key: &FullKey) -> Result<Option<String>, BackendError>;

    async fn put_reference_token_if_absent(
        &self,
        key: &FullKey,
        value: &str,
    ) -> Result<bool, BackendError>;

    async fn get_account_lockout(&self, key: &FullKey) -> Result<Option<String>, BackendError>;

    /// Overwrite the lockout record. Conforming networked backends expire it
    /// after `ttl`.
    async fn set_account_lockout(
        &self,
        key: &FullKey,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, BackendError>;

    async fn get_unit_user_lock(&self, key: &FullKey) -> Result<Option<String>, BackendError>;

    /// Create the unit-user lock unless one exists. Same TTL contract as
    /// `set_account_lockout`.
    async fn put_unit_user_lock_if_absent(
        &self,
        key: &FullKey,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, BackendError>;

    /// `None` when the counter has never been touched (or was removed at zero)
    async fn get_count(&self, key: &FullKey) -> Result<Option<u64>, BackendError>;

    /// Add one, creating the counter at 1
    async fn increment_count(&self, key: &FullKey) -> Result<u64, BackendError>;

    /// Subtract one. Returns the new value, `Some(0)` meaning the entry was
    /// removed; `None` when there was no counter to decrement.
    async fn decrement_count(&self, key: &FullKey) -> Result<Option<u64>, BackendError>;

    async fn get_status(&self, key: &FullKey) -> Result<Option<i64>, BackendError>;

    /// Unconditional overwrite; always `true` on success
    async fn set_status(&self, key: &FullKey, value: i64) -> Result<bool, BackendError>;

    async fn delete_status(&self, key: &FullKey) -> Result<(), BackendError>;

    /// Read-only here; written by an administrative path outside this service
    async fn get_degraded_mode(&self, key: &FullKey) -> Result<Option<String>, BackendError>;
}
