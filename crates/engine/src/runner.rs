// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background execution of bulk deletions

use crate::deletion::{BulkDeletion, DeletionReport};
use crate::error::DeletionError;
use cg_adapters::{BinaryStore, EventLogStore, StorageAccessor};
use cg_core::{Cell, CellId, CoordinationBackend, IdGen, UuidIdGen};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Runs each deletion on its own tokio task so the caller can return at once
pub struct DeletionRunner<S, Bi, L, B, G = UuidIdGen> {
    deletion: Arc<BulkDeletion<S, Bi, L, B, G>>,
}

impl<S, Bi, L, B, G> Clone for DeletionRunner<S, Bi, L, B, G> {
    fn clone(&self) -> Self {
        Self {
            deletion: Arc::clone(&self.deletion),
        }
    }
}

impl<S, Bi, L, B, G> DeletionRunner<S, Bi, L, B, G>
where
    S: StorageAccessor,
    Bi: BinaryStore,
    L: EventLogStore,
    B: CoordinationBackend,
    G: IdGen,
{
    pub fn new(deletion: BulkDeletion<S, Bi, L, B, G>) -> Self {
        Self {
            deletion: Arc::new(deletion),
        }
    }

    /// Start deleting `cell` in the background
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(&self, cell: Cell) -> DeletionHandle {
        let deletion = Arc::clone(&self.deletion);
        let id = cell.id.clone();
        tracing::info!(cell = %id, "bulk deletion scheduled");

        let task = tokio::spawn(async move {
            let result = deletion.run(&cell).await;
            if let Err(e) = &result {
                tracing::error!(
                    cell = %cell.id,
                    error = %e,
                    gated = e.leaves_cell_gated(),
                    "bulk deletion failed"
                );
            }
            result
        });

        DeletionHandle { cell: id, task }
    }
}

/// Handle to a deletion running in the background
#[derive(Debug)]
pub struct DeletionHandle {
    cell: CellId,
    task: JoinHandle<Result<DeletionReport, DeletionError>>,
}

impl DeletionHandle {
    pub fn cell(&self) -> &CellId {
        &self.cell
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the deletion to complete
    pub async fn wait(self) -> Result<DeletionReport, DeletionError> {
        match self.task.await {
            Ok(result) => result,
            Err(source) => Err(DeletionError::Join {
                cell: self.cell,
                source,
            }),
        }
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
