// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake event log store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{EventLogError, EventLogStore};
use async_trait::async_trait;
use cg_core::CellId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Recorded event log removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLogCall {
    pub cell: String,
    pub owner: Option<String>,
}

/// Fake event log store for testing
#[derive(Clone, Default)]
pub struct FakeEventLogStore {
    calls: Arc<Mutex<Vec<EventLogCall>>>,
    fail: Arc<AtomicBool>,
}

impl FakeEventLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent removal fail
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Get all recorded removals
    pub fn calls(&self) -> Vec<EventLogCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl EventLogStore for FakeEventLogStore {
    async fn remove_log(&self, cell: &CellId, owner: Option<&str>) -> Result<(), EventLogError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(EventLogCall {
                cell: cell.to_string(),
                owner: owner.map(str::to_string),
            });
        if self.fail.load(Ordering::SeqCst) {
            return Err(EventLogError::RemoveFailed(format!(
                "archive unreachable for {cell}"
            )));
        }
        Ok(())
    }
}
