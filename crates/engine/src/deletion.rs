// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bulk deletion of a cell
//!
//! The orchestrator moves a cell into `BulkDeletion` through the gate, then
//! tears it down in three ordered phases:
//!
//! 1. binary objects, paged out of the storage index and removed one by one
//! 2. the cell's event logs
//! 3. every structured entity, in one bulk call
//!
//! Only a successful run clears the status register. Any fatal error leaves
//! the cell gated so nothing can touch a half-deleted cell.

use crate::config::DeletionConfig;
use crate::error::DeletionError;
use cg_adapters::{BinaryStore, BinaryStoreError, EventLogStore, StorageAccessor};
use cg_core::{Cell, CellGate, CellId, ConfigError, CoordinationBackend, IdGen, UuidIdGen};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// A binary object that could not be removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedRemoval {
    pub object_id: String,
    pub error: String,
}

/// Result of the event-log phase
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum EventLogOutcome {
    #[default]
    Removed,
    Failed(String),
}

/// What a completed bulk deletion did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub cell: CellId,
    /// Binary records counted at the start of the run
    pub total: u64,
    /// Binary objects removed successfully
    pub removed: u64,
    pub failed: Vec<FailedRemoval>,
    pub event_log: EventLogOutcome,
    /// Pages listed from the storage index
    pub pages: u64,
}

impl DeletionReport {
    fn new(cell: CellId) -> Self {
        Self {
            cell,
            total: 0,
            removed: 0,
            failed: Vec::new(),
            event_log: EventLogOutcome::default(),
            pages: 0,
        }
    }

    /// True when nothing was left behind
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.event_log == EventLogOutcome::Removed
    }

    fn record_removal(&mut self, id: String, result: Result<(), BinaryStoreError>) {
        match result {
            Ok(()) => self.removed += 1,
            Err(e) => self.record_failure(id, e.to_string()),
        }
    }

    fn record_failure(&mut self, id: String, error: String) {
        tracing::warn!(
            cell = %self.cell,
            object_id = %id,
            error = %error,
            "binary removal failed"
        );
        self.failed.push(FailedRemoval {
            object_id: id,
            error,
        });
    }
}

/// Stores a cell's data lives in
pub struct DeletionDeps<S, Bi, L> {
    pub storage: S,
    pub binaries: Bi,
    pub event_logs: L,
}

/// Bulk deletion orchestrator
#[derive(Clone)]
pub struct BulkDeletion<S, Bi, L, B, G = UuidIdGen> {
    storage: S,
    binaries: Bi,
    event_logs: L,
    gate: CellGate<B, G>,
    config: DeletionConfig,
}

impl<S, Bi, L, B, G> BulkDeletion<S, Bi, L, B, G>
where
    S: StorageAccessor,
    Bi: BinaryStore,
    L: EventLogStore,
    B: CoordinationBackend,
    G: IdGen,
{
    /// Fails when `config` has a zero batch size or concurrency
    pub fn new(
        deps: DeletionDeps<S, Bi, L>,
        gate: CellGate<B, G>,
        config: DeletionConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            storage: deps.storage,
            binaries: deps.binaries,
            event_logs: deps.event_logs,
            gate,
            config,
        })
    }

    pub fn gate(&self) -> &CellGate<B, G> {
        &self.gate
    }

    pub fn config(&self) -> &DeletionConfig {
        &self.config
    }

    /// Delete everything the cell owns
    ///
    /// Fails without touching any store when the cell is not `Normal`.
    pub async fn run(&self, cell: &Cell) -> Result<DeletionReport, DeletionError> {
        let start = Instant::now();
        let ticket = self.gate.begin_bulk_deletion(&cell.id).await?;
        let mut report = DeletionReport::new(cell.id.clone());

        self.purge_binaries(cell, &mut report).await?;
        report.event_log = self.purge_event_log(cell).await;

        if let Err(source) = self
            .storage
            .bulk_remove_entities(&cell.id, &cell.unit)
            .await
        {
            tracing::error!(
                cell = %cell.id,
                error = %source,
                "entity purge failed, cell left in bulk deletion"
            );
            return Err(DeletionError::EntityPurge {
                cell: cell.id.clone(),
                source,
            });
        }

        if let Err(source) = self.gate.finish_bulk_deletion(ticket).await {
            tracing::error!(
                cell = %cell.id,
                error = %source,
                "cell purged but status not cleared, cell left in bulk deletion"
            );
            return Err(DeletionError::ClearStatus {
                cell: cell.id.clone(),
                source,
            });
        }
        tracing::info!(
            cell = %cell.id,
            total = report.total,
            removed = report.removed,
            failed = report.failed.len(),
            pages = report.pages,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "cell deleted"
        );
        Ok(report)
    }

    async fn purge_binaries(
        &self,
        cell: &Cell,
        report: &mut DeletionReport,
    ) -> Result<(), DeletionError> {
        let total = self
            .storage
            .count_binary_records(&cell.id, &cell.unit)
            .await
            .map_err(|source| DeletionError::Count {
                cell: cell.id.clone(),
                source,
            })?;
        report.total = total;
        tracing::info!(cell = %cell.id, total, "purging binary objects");

        let limit = self.config.batch_size;
        let mut offset = 0;
        while offset < total {
            let ids = self
                .storage
                .list_binary_record_ids(&cell.id, &cell.unit, limit, offset)
                .await
                .map_err(|source| DeletionError::List {
                    cell: cell.id.clone(),
                    offset,
                    source,
                })?;
            report.pages += 1;
            self.purge_page(ids, report).await;
            offset += limit;
        }
        Ok(())
    }

    async fn purge_page(&self, ids: Vec<String>, report: &mut DeletionReport) {
        if self.config.purge_concurrency <= 1 {
            for id in ids {
                let result = self.binaries.remove(&id).await;
                report.record_removal(id, result);
            }
            return;
        }

        // A removal that panics is recorded against its object id like any
        // other failure; the rest of the page keeps running.
        let permits = Arc::new(Semaphore::new(self.config.purge_concurrency));
        let mut tasks = JoinSet::new();
        let mut pending = HashMap::new();
        for id in ids {
            let permits = Arc::clone(&permits);
            let binaries = self.binaries.clone();
            let object_id = id.clone();
            let task = tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                binaries.remove(&object_id).await
            });
            pending.insert(task.id(), id);
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((task, result)) => {
                    if let Some(id) = pending.remove(&task) {
                        report.record_removal(id, result);
                    }
                }
                Err(e) => {
                    if let Some(id) = pending.remove(&e.id()) {
                        report.record_failure(id, format!("removal task failed: {e}"));
                    }
                }
            }
        }
    }

    async fn purge_event_log(&self, cell: &Cell) -> EventLogOutcome {
        match self
            .event_logs
            .remove_log(&cell.id, cell.owner.as_deref())
            .await
        {
            Ok(()) => EventLogOutcome::Removed,
            Err(e) => {
                tracing::warn!(cell = %cell.id, error = %e, "event log removal failed");
                EventLogOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
#[path = "deletion_tests.rs"]
mod tests;
