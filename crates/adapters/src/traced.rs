// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::binary::{BinaryStore, BinaryStoreError};
use crate::event_log::{EventLogError, EventLogStore};
use crate::storage::{StorageAccessor, StorageError};
use async_trait::async_trait;
use cg_core::CellId;
use tracing::Instrument;

/// Wrapper that adds tracing to any StorageAccessor
#[derive(Clone)]
pub struct TracedStorageAccessor<S> {
    inner: S,
}

impl<S> TracedStorageAccessor<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: StorageAccessor> StorageAccessor for TracedStorageAccessor<S> {
    async fn count_binary_records(&self, cell: &CellId, scope: &str) -> Result<u64, StorageError> {
        let span = tracing::info_span!("storage.count", %cell, scope);
        async move {
            let start = std::time::Instant::now();
            let result = self.inner.count_binary_records(cell, scope).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(total) => tracing::debug!(
                    total,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "binary records counted"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "count failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn list_binary_record_ids(
        &self,
        cell: &CellId,
        scope: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<String>, StorageError> {
        let span = tracing::info_span!("storage.list", %cell, limit, offset);
        async move {
            let result = self
                .inner
                .list_binary_record_ids(cell, scope, limit, offset)
                .await;

            match &result {
                Ok(ids) => tracing::debug!(returned = ids.len(), "page listed"),
                Err(e) => tracing::error!(error = %e, "list failed"),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn bulk_remove_entities(&self, cell: &CellId, scope: &str) -> Result<(), StorageError> {
        let span = tracing::info_span!("storage.bulk_remove", %cell, scope);
        async move {
            tracing::info!("removing entities");
            let start = std::time::Instant::now();
            let result = self.inner.bulk_remove_entities(cell, scope).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(()) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "entities removed"),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "entity removal failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any BinaryStore
#[derive(Clone)]
pub struct TracedBinaryStore<B> {
    inner: B,
}

impl<B> TracedBinaryStore<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<B: BinaryStore> BinaryStore for TracedBinaryStore<B> {
    async fn remove(&self, object_id: &str) -> Result<(), BinaryStoreError> {
        let span = tracing::debug_span!("binary.remove", object_id);
        async move {
            let result = self.inner.remove(object_id).await;

            match &result {
                Ok(()) => tracing::trace!("object removed"),
                Err(e) => tracing::warn!(error = %e, "object removal failed"),
            }

            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any EventLogStore
#[derive(Clone)]
pub struct TracedEventLogStore<L> {
    inner: L,
}

impl<L> TracedEventLogStore<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<L: EventLogStore> EventLogStore for TracedEventLogStore<L> {
    async fn remove_log(&self, cell: &CellId, owner: Option<&str>) -> Result<(), EventLogError> {
        let span = tracing::info_span!("event_log.remove", %cell, owner);
        async move {
            let result = self.inner.remove_log(cell, owner).await;

            match &result {
                Ok(()) => tracing::info!("event log removed"),
                Err(e) => tracing::warn!(error = %e, "event log removal failed"),
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
