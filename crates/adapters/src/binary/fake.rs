// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake binary store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{BinaryStore, BinaryStoreError};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeBinaryState {
    objects: BTreeSet<String>,
    failing: HashSet<String>,
    removals: Vec<String>,
}

/// Fake binary store for testing
///
/// Every `remove` call is recorded, including failed and repeated ones.
#[derive(Clone, Default)]
pub struct FakeBinaryStore {
    inner: Arc<Mutex<FakeBinaryState>>,
}

impl FakeBinaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed objects the store holds
    pub fn with_objects<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .objects
            .extend(ids.into_iter().map(Into::into));
        self
    }

    /// Make removal of `id` fail
    pub fn fail_on(&self, id: &str) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .failing
            .insert(id.to_string());
    }

    /// Ids passed to `remove`, in call order
    pub fn removals(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .removals
            .clone()
    }

    /// Objects still held
    pub fn objects(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .objects
            .iter()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BinaryStore for FakeBinaryStore {
    async fn remove(&self, object_id: &str) -> Result<(), BinaryStoreError> {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.removals.push(object_id.to_string());
        if state.failing.contains(object_id) {
            return Err(BinaryStoreError::RemoveFailed {
                id: object_id.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        state.objects.remove(object_id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
