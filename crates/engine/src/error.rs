// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the deletion engine

use cg_adapters::StorageError;
use cg_core::{CellId, CoordinationError};
use thiserror::Error;

/// Errors that abort a bulk deletion
///
/// Per-object binary removal failures and event-log failures never show up
/// here; they are collected in the [`crate::DeletionReport`].
#[derive(Debug, Error)]
pub enum DeletionError {
    #[error(transparent)]
    Coordination(#[from] CoordinationError),
    #[error("failed to count binary records of cell {cell}: {source}")]
    Count {
        cell: CellId,
        #[source]
        source: StorageError,
    },
    #[error("failed to list binary records of cell {cell} at offset {offset}: {source}")]
    List {
        cell: CellId,
        offset: u64,
        #[source]
        source: StorageError,
    },
    #[error("entity purge failed for cell {cell}: {source}")]
    EntityPurge {
        cell: CellId,
        #[source]
        source: StorageError,
    },
    #[error("cell {cell} was purged but its status could not be cleared: {source}")]
    ClearStatus {
        cell: CellId,
        #[source]
        source: CoordinationError,
    },
    #[error("deletion task for cell {cell} did not complete: {source}")]
    Join {
        cell: CellId,
        #[source]
        source: tokio::task::JoinError,
    },
}

impl DeletionError {
    /// Whether the cell was left in `BulkDeletion` and needs an operator
    ///
    /// Only a refusal to start (busy cell, lock timeout) leaves the status
    /// untouched.
    pub fn leaves_cell_gated(&self) -> bool {
        !matches!(self, DeletionError::Coordination(_))
    }
}
