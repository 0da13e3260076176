// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured entity storage of a cell

mod noop;

pub use noop::NoOpStorageAccessor;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeStorageAccessor, StorageCall};

use async_trait::async_trait;
use cg_core::CellId;
use thiserror::Error;

/// Errors from the storage accessor
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("bulk removal incomplete for cell {cell}: {reason}")]
    BulkRemoveFailed { cell: String, reason: String },
}

/// Access to the index/document store holding a cell's entity records
#[async_trait]
pub trait StorageAccessor: Clone + Send + Sync + 'static {
    /// Number of binary (file) records the cell owns
    async fn count_binary_records(&self, cell: &CellId, scope: &str) -> Result<u64, StorageError>;

    /// Ids of binary records in a stable order, `limit` of them from `offset`
    async fn list_binary_record_ids(
        &self,
        cell: &CellId,
        scope: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<String>, StorageError>;

    /// Remove every structured record the cell owns
    async fn bulk_remove_entities(&self, cell: &CellId, scope: &str) -> Result<(), StorageError>;
}
