// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op storage accessor for cells with no structured storage.

use super::{StorageAccessor, StorageError};
use async_trait::async_trait;
use cg_core::CellId;

/// Storage accessor that holds no records.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpStorageAccessor;

impl NoOpStorageAccessor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StorageAccessor for NoOpStorageAccessor {
    async fn count_binary_records(&self, _cell: &CellId, _scope: &str) -> Result<u64, StorageError> {
        Ok(0)
    }

    async fn list_binary_record_ids(
        &self,
        _cell: &CellId,
        _scope: &str,
        _limit: u64,
        _offset: u64,
    ) -> Result<Vec<String>, StorageError> {
        Ok(Vec::new())
    }

    async fn bulk_remove_entities(&self, _cell: &CellId, _scope: &str) -> Result<(), StorageError> {
        Ok(())
    }
}
