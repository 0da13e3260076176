// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake storage accessor for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{StorageAccessor, StorageError};
use async_trait::async_trait;
use cg_core::CellId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Recorded storage call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    Count { cell: String, scope: String },
    List { cell: String, limit: u64, offset: u64 },
    BulkRemove { cell: String, scope: String },
}

#[derive(Default)]
struct FakeState {
    /// Binary record ids per cell, in listing order
    records: HashMap<String, Vec<String>>,
    /// Non-binary entity count per cell
    entities: HashMap<String, u64>,
    fail_count: bool,
    fail_list_offsets: HashSet<u64>,
    fail_bulk_remove: bool,
}

/// Fake storage accessor for testing
#[derive(Clone, Default)]
pub struct FakeStorageAccessor {
    state: Arc<Mutex<FakeState>>,
    calls: Arc<Mutex<Vec<StorageCall>>>,
}

impl FakeStorageAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a cell with `files` binary records (`<cell>-file-<n>`) and
    /// `entities` other records
    pub fn with_cell(self, cell: &str, files: usize, entities: u64) -> Self {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            let ids = (0..files).map(|n| format!("{cell}-file-{n}")).collect();
            state.records.insert(cell.to_string(), ids);
            state.entities.insert(cell.to_string(), entities);
        }
        self
    }

    /// Make `count_binary_records` fail
    pub fn fail_count(&self) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).fail_count = true;
    }

    /// Make the page listed at `offset` fail
    pub fn fail_list_at(&self, offset: u64) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .fail_list_offsets
            .insert(offset);
    }

    /// Make `bulk_remove_entities` fail
    pub fn fail_bulk_remove(&self) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .fail_bulk_remove = true;
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Binary record ids still stored for a cell
    pub fn record_ids(&self, cell: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .records
            .get(cell)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether any record (binary or not) remains for a cell
    pub fn has_cell(&self, cell: &str) -> bool {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.records.contains_key(cell) || state.entities.contains_key(cell)
    }

    fn record(&self, call: StorageCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl StorageAccessor for FakeStorageAccessor {
    async fn count_binary_records(&self, cell: &CellId, scope: &str) -> Result<u64, StorageError> {
        self.record(StorageCall::Count {
            cell: cell.to_string(),
            scope: scope.to_string(),
        });

        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.fail_count {
            return Err(StorageError::Unavailable("count refused".to_string()));
        }
        Ok(state
            .records
            .get(cell.as_str())
            .map_or(0, |ids| ids.len() as u64))
    }

    async fn list_binary_record_ids(
        &self,
        cell: &CellId,
        _scope: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<String>, StorageError> {
        self.record(StorageCall::List {
            cell: cell.to_string(),
            limit,
            offset,
        });

        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.fail_list_offsets.contains(&offset) {
            return Err(StorageError::QueryFailed(format!("page at {offset}")));
        }
        let ids = state
            .records
            .get(cell.as_str())
            .map(|ids| {
                ids.iter()
                    .skip(offset as usize)
                    .take(limit as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(ids)
    }

    async fn bulk_remove_entities(&self, cell: &CellId, scope: &str) -> Result<(), StorageError> {
        self.record(StorageCall::BulkRemove {
            cell: cell.to_string(),
            scope: scope.to_string(),
        });

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.fail_bulk_remove {
            return Err(StorageError::BulkRemoveFailed {
                cell: cell.to_string(),
                reason: "index rejected delete-by-query".to_string(),
            });
        }
        state.records.remove(cell.as_str());
        state.entities.remove(cell.as_str());
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
