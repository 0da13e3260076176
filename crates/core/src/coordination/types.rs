// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed values stored in or derived from coordination entries

use crate::id::HolderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payload of an exclusive lock entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockToken {
    pub holder: HolderId,
    /// What the holder is doing (e.g. "put", "bulk-deletion")
    pub action: String,
    pub acquired_at: DateTime<Utc>,
}

impl LockToken {
    pub fn new(holder: HolderId, action: impl Into<String>) -> Self {
        Self {
            holder,
            action: action.into(),
            acquired_at: Utc::now(),
        }
    }

    /// Serialized form for backends that store opaque strings
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Value of a usage counter
///
/// `Absent` means no entry exists. `Zero` is only ever reported by a
/// decrement that just removed the entry; a stored counter is never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterValue {
    Absent,
    Zero,
    Positive(u64),
}

impl CounterValue {
    pub(crate) fn from_stored(value: Option<u64>) -> Self {
        match value {
            None => CounterValue::Absent,
            Some(0) => CounterValue::Zero,
            Some(n) => CounterValue::Positive(n),
        }
    }

    /// Logical count, treating absent as zero
    pub fn get(self) -> u64 {
        match self {
            CounterValue::Absent | CounterValue::Zero => 0,
            CounterValue::Positive(n) => n,
        }
    }

    pub fn is_in_use(self) -> bool {
        matches!(self, CounterValue::Positive(_))
    }
}

/// Lifecycle status of a cell, stored in its status register
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellStatus {
    Normal,
    BulkDeletion,
    Exporting,
    Importing,
}

impl CellStatus {
    pub fn code(self) -> i64 {
        match self {
            CellStatus::Normal => 0,
            CellStatus::BulkDeletion => 1,
            CellStatus::Exporting => 2,
            CellStatus::Importing => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(CellStatus::Normal),
            1 => Some(CellStatus::BulkDeletion),
            2 => Some(CellStatus::Exporting),
            3 => Some(CellStatus::Importing),
            _ => None,
        }
    }
}

impl fmt::Display for CellStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CellStatus::Normal => "normal",
            CellStatus::BulkDeletion => "bulk-deletion",
            CellStatus::Exporting => "exporting",
            CellStatus::Importing => "importing",
        };
        f.write_str(name)
    }
}

/// Restricted operating mode set on a cell by an administrator
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DegradedMode {
    /// Reads and deletes are allowed, writes are refused
    ReadDeleteOnly,
    Other(String),
}

impl DegradedMode {
    pub const READ_DELETE_ONLY: &'static str = "read-delete-only";

    pub fn parse(token: &str) -> Self {
        if token == Self::READ_DELETE_ONLY {
            DegradedMode::ReadDeleteOnly
        } else {
            DegradedMode::Other(token.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DegradedMode::ReadDeleteOnly => Self::READ_DELETE_ONLY,
            DegradedMode::Other(token) => token,
        }
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
