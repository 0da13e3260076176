// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced backend wrapper for consistent observability

use super::backend::{BackendError, CoordinationBackend};
use super::key::FullKey;
use super::types::LockToken;
use async_trait::async_trait;
use std::fmt::Debug;
use std::time::{Duration, Instant};

/// Wrapper that adds tracing to any CoordinationBackend
#[derive(Clone, Debug)]
pub struct TracedBackend<B> {
    inner: B,
}

impl<B> TracedBackend<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }
}

fn observe<T: Debug>(
    op: &'static str,
    key: &FullKey,
    start: Instant,
    result: &Result<T, BackendError>,
) {
    let elapsed_us = start.elapsed().as_micros() as u64;
    match result {
        Ok(value) => tracing::trace!(op, %key, elapsed_us, result = ?value, "coordination call"),
        Err(e) => tracing::error!(op, %key, elapsed_us, error = %e, "coordination call failed"),
    }
}

/// Log lost if-absent races at debug: contention is expected, but worth seeing
fn observe_claim(
    op: &'static str,
    key: &FullKey,
    start: Instant,
    result: &Result<bool, BackendError>,
) {
    observe(op, key, start, result);
    if matches!(result, Ok(false)) {
        tracing::debug!(op, %key, "entry already present");
    }
}

#[async_trait]
impl<B: CoordinationBackend> CoordinationBackend for TracedBackend<B> {
    async fn get_lock(&self, key: &FullKey) -> Result<Option<LockToken>, BackendError> {
        let start = Instant::now();
        let result = self.inner.get_lock(key).await;
        observe("get_lock", key, start, &result);
        result
    }

    async fn put_lock_if_absent(
        &self,
        key: &FullKey,
        token: LockToken,
    ) -> Result<bool, BackendError> {
        let start = Instant::now();
        let holder = token.holder.clone();
        let result = self.inner.put_lock_if_absent(key, token).await;
        observe_claim("put_lock_if_absent", key, start, &result);
        if matches!(result, Ok(true)) {
            tracing::debug!(%key, %holder, "lock acquired");
        }
        result
    }

    async fn release_lock(&self, key: &FullKey) -> Result<(), BackendError> {
        let start = Instant::now();
        let result = self.inner.release_lock(key).await;
        observe("release_lock", key, start, &result);
        result
    }

    async fn delete_all(&self) -> Result<(), BackendError> {
        tracing::warn!("clearing all coordination entries");
        let result = self.inner.delete_all().await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "delete_all failed");
        }
        result
    }

    async fn get_reference_token(&self, key: &FullKey) -> Result<Option<String>, BackendError> {
        let start = Instant::now();
        let result = self.inner.get_reference_token(key).await;
        observe("get_reference_token", key, start, &result);
        result
    }

    async fn put_reference_token_if_absent(
        &self,
        key: &FullKey,
        value: &str,
    ) -> Result<bool, BackendError> {
        let start = Instant::now();
        let result = self.inner.put_reference_token_if_absent(key, value).await;
        observe_claim("put_reference_token_if_absent", key, start, &result);
        result
    }

    async fn get_account_lockout(&self, key: &FullKey) -> Result<Option<String>, BackendError> {
        let start = Instant::now();
        let result = self.inner.get_account_lockout(key).await;
        observe("get_account_lockout", key, start, &result);
        result
    }

    async fn set_account_lockout(
        &self,
        key: &FullKey,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, BackendError> {
        let start = Instant::now();
        let result = self.inner.set_account_lockout(key, value, ttl).await;
        observe("set_account_lockout", key, start, &result);
        if result.is_ok() {
            tracing::info!(%key, ttl = %humantime::format_duration(ttl), "account locked out");
        }
        result
    }

    async fn get_unit_user_lock(&self, key: &FullKey) -> Result<Option<String>, BackendError> {
        let start = Instant::now();
        let result = self.inner.get_unit_user_lock(key).await;
        observe("get_unit_user_lock", key, start, &result);
        result
    }

    async fn put_unit_user_lock_if_absent(
        &self,
        key: &FullKey,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, BackendError> {
        let start = Instant::now();
        let result = self.inner.put_unit_user_lock_if_absent(key, value, ttl).await;
        observe_claim("put_unit_user_lock_if_absent", key, start, &result);
        result
    }

    async fn get_count(&self, key: &FullKey) -> Result<Option<u64>, BackendError> {
        let start = Instant::now();
        let result = self.inner.get_count(key).await;
        observe("get_count", key, start, &result);
        result
    }

    async fn increment_count(&self, key: &FullKey) -> Result<u64, BackendError> {
        let start = Instant::now();
        let result = self.inner.increment_count(key).await;
        observe("increment_count", key, start, &result);
        result
    }

    async fn decrement_count(&self, key: &FullKey) -> Result<Option<u64>, BackendError> {
        let start = Instant::now();
        let result = self.inner.decrement_count(key).await;
        observe("decrement_count", key, start, &result);
        if matches!(result, Ok(None)) {
            tracing::warn!(%key, "decrement of a counter that does not exist");
        }
        result
    }

    async fn get_status(&self, key: &FullKey) -> Result<Option<i64>, BackendError> {
        let start = Instant::now();
        let result = self.inner.get_status(key).await;
        observe("get_status", key, start, &result);
        result
    }

    async fn set_status(&self, key: &FullKey, value: i64) -> Result<bool, BackendError> {
        let start = Instant::now();
        let result = self.inner.set_status(key, value).await;
        observe("set_status", key, start, &result);
        if result.is_ok() {
            tracing::info!(%key, status = value, "status set");
        }
        result
    }

    async fn delete_status(&self, key: &FullKey) -> Result<(), BackendError> {
        let start = Instant::now();
        let result = self.inner.delete_status(key).await;
        observe("delete_status", key, start, &result);
        if result.is_ok() {
            tracing::info!(%key, "status cleared");
        }
        result
    }

    async fn get_degraded_mode(&self, key: &FullKey) -> Result<Option<String>, BackendError> {
        let start = Instant::now();
        let result = self.inner.get_degraded_mode(key).await;
        observe("get_degraded_mode", key, start, &result);
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
