// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cell identity
//!
//! A cell is the tenant unit: the scope of status gating and of bulk deletion.

use serde::{Deserialize, Serialize};

/// Unique identifier of a cell
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellId(pub String);

impl CellId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the orchestrator needs to know about a cell to tear it down
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    /// Storage scope (unit prefix) the cell's records live under
    pub unit: String,
    /// Unit user owning the cell, if any; event logs are filed under it
    pub owner: Option<String>,
}

impl Cell {
    pub fn new(id: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            id: CellId::new(id),
            unit: unit.into(),
            owner: None,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}
