// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-cell event log storage

mod noop;

pub use noop::NoOpEventLogStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{EventLogCall, FakeEventLogStore};

use async_trait::async_trait;
use cg_core::CellId;
use thiserror::Error;

/// Errors from event log operations
#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("event log removal failed: {0}")]
    RemoveFailed(String),
}

/// Store of the archived event logs produced by a cell
#[async_trait]
pub trait EventLogStore: Clone + Send + Sync + 'static {
    /// Remove every event log the cell (and its owner, if any) produced
    async fn remove_log(&self, cell: &CellId, owner: Option<&str>) -> Result<(), EventLogError>;
}
