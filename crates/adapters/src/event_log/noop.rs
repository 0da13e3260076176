// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op event log store for deployments without event archiving.

use super::{EventLogError, EventLogStore};
use async_trait::async_trait;
use cg_core::CellId;

/// Event log store that holds nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpEventLogStore;

impl NoOpEventLogStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventLogStore for NoOpEventLogStore {
    async fn remove_log(&self, _cell: &CellId, _owner: Option<&str>) -> Result<(), EventLogError> {
        Ok(())
    }
}
