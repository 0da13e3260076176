// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process coordination backend
//!
//! A single mutex-guarded table shared by every clone. Each trait operation
//! takes the mutex exactly once, so check-and-set never spans two critical
//! sections. Coordination is limited to the current process.
//!
//! With [`ExpiryPolicy::Ignore`] (the default) the TTL given to account
//! lockouts and unit-user locks is accepted and dropped: those entries stay
//! until deleted or the process exits. [`ExpiryPolicy::Lazy`] makes them read
//! as absent once their deadline passes.

use super::backend::{BackendError, CoordinationBackend};
use super::key::FullKey;
use super::types::LockToken;
use crate::clock::{Clock, SystemClock};
use crate::config::{CoordinationConfig, ExpiryPolicy};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExpiringKind {
    AccountLockout,
    UnitUserLock,
}

impl ExpiringKind {
    fn name(self) -> &'static str {
        match self {
            ExpiringKind::AccountLockout => "account lockout",
            ExpiringKind::UnitUserLock => "unit-user lock",
        }
    }
}

#[derive(Clone, Debug)]
enum Entry {
    Lock(LockToken),
    Reference(String),
    Expiring {
        kind: ExpiringKind,
        value: String,
        /// `None` when the TTL was too large to represent
        expires_at: Option<Instant>,
    },
    Count(u64),
    Status(i64),
    DegradedMode(String),
}

fn mismatch(key: &FullKey, expected: &'static str) -> BackendError {
    BackendError::EntryKindMismatch {
        key: key.to_string(),
        expected,
    }
}

type Table = HashMap<FullKey, Entry>;

/// Coordination backend holding every entry in process memory
#[derive(Clone, Debug)]
pub struct InMemoryBackend<C = SystemClock> {
    entries: Arc<Mutex<Table>>,
    expiry: ExpiryPolicy,
    clock: C,
}

impl InMemoryBackend<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(ExpiryPolicy::Ignore, SystemClock)
    }

    pub fn from_config(config: &CoordinationConfig) -> Self {
        Self::with_clock(config.expiry, SystemClock)
    }
}

impl Default for InMemoryBackend<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> InMemoryBackend<C> {
    pub fn with_clock(expiry: ExpiryPolicy, clock: C) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            expiry,
            clock,
        }
    }

    /// Number of stored entries, expired-but-unvisited ones included
    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }

    /// Whether any entry (of any kind) is stored at `key`
    pub fn contains_key(&self, key: &FullKey) -> bool {
        self.table().contains_key(key)
    }

    /// Administrative write of a cell's degraded-mode flag
    pub fn set_degraded_mode(&self, key: &FullKey, mode: &str) {
        self.table()
            .insert(key.clone(), Entry::DegradedMode(mode.to_string()));
    }

    fn table(&self) -> MutexGuard<'_, Table> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_expired(&self, expires_at: Option<Instant>) -> bool {
        match (self.expiry, expires_at) {
            (ExpiryPolicy::Lazy, Some(deadline)) => self.clock.now() >= deadline,
            _ => false,
        }
    }

    /// Read a live expiring entry, evicting it if its deadline has passed
    fn read_expiring(
        &self,
        table: &mut Table,
        key: &FullKey,
        kind: ExpiringKind,
    ) -> Result<Option<String>, BackendError> {
        let live = match table.get(key) {
            None => return Ok(None),
            Some(Entry::Expiring {
                kind: k,
                value,
                expires_at,
            }) if *k == kind => {
                if self.is_expired(*expires_at) {
                    None
                } else {
                    Some(value.clone())
                }
            }
            Some(_) => return Err(mismatch(key, kind.name())),
        };
        if live.is_none() {
            table.remove(key);
        }
        Ok(live)
    }

    fn expiring(&self, kind: ExpiringKind, value: &str, ttl: Duration) -> Entry {
        Entry::Expiring {
            kind,
            value: value.to_string(),
            expires_at: self.clock.deadline(ttl),
        }
    }
}

#[async_trait]
impl<C: Clock> CoordinationBackend for InMemoryBackend<C> {
    async fn get_lock(&self, key: &FullKey) -> Result<Option<LockToken>, BackendError> {
        match self.table().get(key) {
            None => Ok(None),
            Some(Entry::Lock(token)) => Ok(Some(token.clone())),
            Some(_) => Err(mismatch(key, "lock")),
        }
    }

    async fn put_lock_if_absent(
        &self,
        key: &FullKey,
        token: LockToken,
    ) -> Result<bool, BackendError> {
        let mut table = self.table();
        match table.get(key) {
            None => {
                table.insert(key.clone(), Entry::Lock(token));
                Ok(true)
            }
            Some(Entry::Lock(_)) => Ok(false),
            Some(_) => Err(mismatch(key, "lock")),
        }
    }

    async fn release_lock(&self, key: &FullKey) -> Result<(), BackendError> {
        let mut table = self.table();
        match table.get(key) {
            None => Ok(()),
            Some(Entry::Lock(_)) => {
                table.remove(key);
                Ok(())
            }
            Some(_) => Err(mismatch(key, "lock")),
        }
    }

    async fn delete_all(&self) -> Result<(), BackendError> {
        self.table().clear();
        Ok(())
    }

    async fn get_reference_token(&self, key: &FullKey) -> Result<Option<String>, BackendError> {
        match self.table().get(key) {
            None => Ok(None),
            Some(Entry::Reference(value)) => Ok(Some(value.clone())),
            Some(_) => Err(mismatch(key, "reference token")),
        }
    }

    async fn put_reference_token_if_absent(
        &self,
        key: &FullKey,
        value: &str,
    ) -> Result<bool, BackendError> {
        let mut table = self.table();
        match table.get(key) {
            None => {
                table.insert(key.clone(), Entry::Reference(value.to_string()));
                Ok(true)
            }
            Some(Entry::Reference(_)) => Ok(false),
            Some(_) => Err(mismatch(key, "reference token")),
        }
    }

    async fn get_account_lockout(&self, key: &FullKey) -> Result<Option<String>, BackendError> {
        let mut table = self.table();
        self.read_expiring(&mut table, key, ExpiringKind::AccountLockout)
    }

    async fn set_account_lockout(
        &self,
        key: &FullKey,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, BackendError> {
        let mut table = self.table();
        match table.get(key) {
            None
            | Some(Entry::Expiring {
                kind: ExpiringKind::AccountLockout,
                ..
            }) => {
                let entry = self.expiring(ExpiringKind::AccountLockout, value, ttl);
                table.insert(key.clone(), entry);
                Ok(true)
            }
            Some(_) => Err(mismatch(key, ExpiringKind::AccountLockout.name())),
        }
    }

    async fn get_unit_user_lock(&self, key: &FullKey) -> Result<Option<String>, BackendError> {
        let mut table = self.table();
        self.read_expiring(&mut table, key, ExpiringKind::UnitUserLock)
    }

    async fn put_unit_user_lock_if_absent(
        &self,
        key: &FullKey,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, BackendError> {
        let mut table = self.table();
        if self
            .read_expiring(&mut table, key, ExpiringKind::UnitUserLock)?
            .is_some()
        {
            return Ok(false);
        }
        let entry = self.expiring(ExpiringKind::UnitUserLock, value, ttl);
        table.insert(key.clone(), entry);
        Ok(true)
    }

    async fn get_count(&self, key: &FullKey) -> Result<Option<u64>, BackendError> {
        match self.table().get(key) {
            None => Ok(None),
            Some(Entry::Count(n)) => Ok(Some(*n)),
            Some(_) => Err(mismatch(key, "counter")),
        }
    }

    async fn increment_count(&self, key: &FullKey) -> Result<u64, BackendError> {
        let mut table = self.table();
        let next = match table.get(key) {
            None => 1,
            Some(Entry::Count(n)) => n.saturating_add(1),
            Some(_) => return Err(mismatch(key, "counter")),
        };
        table.insert(key.clone(), Entry::Count(next));
        Ok(next)
    }

    async fn decrement_count(&self, key: &FullKey) -> Result<Option<u64>, BackendError> {
        let mut table = self.table();
        let next = match table.get(key) {
            None => return Ok(None),
            Some(Entry::Count(n)) => n.saturating_sub(1),
            Some(_) => return Err(mismatch(key, "counter")),
        };
        if next == 0 {
            table.remove(key);
        } else {
            table.insert(key.clone(), Entry::Count(next));
        }
        Ok(Some(next))
    }

    async fn get_status(&self, key: &FullKey) -> Result<Option<i64>, BackendError> {
        match self.table().get(key) {
            None => Ok(None),
            Some(Entry::Status(code)) => Ok(Some(*code)),
            Some(_) => Err(mismatch(key, "status")),
        }
    }

    async fn set_status(&self, key: &FullKey, value: i64) -> Result<bool, BackendError> {
        let mut table = self.table();
        match table.get(key) {
            None | Some(Entry::Status(_)) => {
                table.insert(key.clone(), Entry::Status(value));
                Ok(true)
            }
            Some(_) => Err(mismatch(key, "status")),
        }
    }

    async fn delete_status(&self, key: &FullKey) -> Result<(), BackendError> {
        let mut table = self.table();
        match table.get(key) {
            None => Ok(()),
            Some(Entry::Status(_)) => {
                table.remove(key);
                Ok(())
            }
            Some(_) => Err(mismatch(key, "status")),
        }
    }

    async fn get_degraded_mode(&self, key: &FullKey) -> Result<Option<String>, BackendError> {
        match self.table().get(key) {
            None => Ok(None),
            Some(Entry::DegradedMode(mode)) => Ok(Some(mode.clone())),
            Some(_) => Err(mismatch(key, "degraded-mode flag")),
        }
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
