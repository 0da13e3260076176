// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cell gate: status-register checks in front of cell operations
//!
//! Request handlers call [`CellGate::check`] before touching a cell. The
//! bulk-deletion orchestrator moves a cell into `BulkDeletion` through
//! [`CellGate::begin_bulk_deletion`], which holds the cell-level lock around
//! the status transition so two callers cannot both start a deletion.

use super::backend::CoordinationBackend;
use super::key::ResourcePath;
use super::service::{CoordinationError, CoordinationService};
use super::types::{CellStatus, DegradedMode};
use crate::cell::CellId;
use crate::id::{IdGen, UuidIdGen};
use chrono::{DateTime, Utc};

/// Kind of access a caller wants to a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    Delete,
}

/// Issued when a cell has entered `BulkDeletion`
#[derive(Debug)]
pub struct BulkDeletionTicket {
    cell: CellId,
    started_at: DateTime<Utc>,
}

impl BulkDeletionTicket {
    pub fn cell(&self) -> &CellId {
        &self.cell
    }
}

/// Status gate over a coordination service
#[derive(Clone, Debug)]
pub struct CellGate<B, G = UuidIdGen> {
    service: CoordinationService<B, G>,
}

impl<B: CoordinationBackend, G: IdGen> CellGate<B, G> {
    pub fn new(service: CoordinationService<B, G>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &CoordinationService<B, G> {
        &self.service
    }

    /// Refuse access the cell's status or degraded mode does not allow
    pub async fn check(&self, cell: &CellId, access: Access) -> Result<(), CoordinationError> {
        match self.service.cell_status(cell).await? {
            CellStatus::BulkDeletion => {
                return Err(CoordinationError::CellBeingDeleted(cell.clone()));
            }
            status @ (CellStatus::Exporting | CellStatus::Importing) if access != Access::Read => {
                return Err(CoordinationError::CellBusy {
                    cell: cell.clone(),
                    status,
                });
            }
            _ => {}
        }

        if access == Access::Write
            && self.service.degraded_mode(cell).await? == Some(DegradedMode::ReadDeleteOnly)
        {
            return Err(CoordinationError::ReadDeleteOnly(cell.clone()));
        }

        Ok(())
    }

    /// Move a `Normal` cell into `BulkDeletion`
    ///
    /// Fails with `CellBusy` when the cell is in any other status.
    pub async fn begin_bulk_deletion(
        &self,
        cell: &CellId,
    ) -> Result<BulkDeletionTicket, CoordinationError> {
        let handle = self
            .service
            .lock(cell, &ResourcePath::cell(), "bulk-deletion")
            .await?;

        let transition = self.transition_to_deletion(cell).await;
        let released = self.service.release(handle).await;

        let ticket = transition?;
        released?;
        tracing::info!(%cell, "cell entered bulk deletion");
        Ok(ticket)
    }

    async fn transition_to_deletion(
        &self,
        cell: &CellId,
    ) -> Result<BulkDeletionTicket, CoordinationError> {
        let status = self.service.cell_status(cell).await?;
        if status != CellStatus::Normal {
            return Err(CoordinationError::CellBusy {
                cell: cell.clone(),
                status,
            });
        }
        self.service
            .set_cell_status(cell, CellStatus::BulkDeletion)
            .await?;
        Ok(BulkDeletionTicket {
            cell: cell.clone(),
            started_at: Utc::now(),
        })
    }

    /// Clear the status register once the cell is gone
    pub async fn finish_bulk_deletion(
        &self,
        ticket: BulkDeletionTicket,
    ) -> Result<(), CoordinationError> {
        self.service.clear_cell_status(&ticket.cell).await?;
        tracing::info!(
            cell = %ticket.cell,
            elapsed_s = (Utc::now() - ticket.started_at).num_seconds(),
            "bulk deletion finished"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
