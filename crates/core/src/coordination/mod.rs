// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keyed coordination between concurrent callers
//!
//! This module provides:
//! - **Key namespace** - collision-free full keys per category, cell and resource
//! - **CoordinationBackend** - pluggable keyed storage with atomic create-if-absent
//! - **InMemoryBackend** - single-process backend behind one mutex
//! - **CoordinationService** - typed locks, tokens, counters, status and lockouts
//! - **CellGate** - status checks and the guarded entry into bulk deletion

pub mod backend;
pub mod gate;
pub mod key;
pub mod memory;
pub mod service;
pub mod traced;
pub mod types;

pub use backend::{BackendError, CoordinationBackend};
pub use gate::{Access, BulkDeletionTicket, CellGate};
pub use key::{Category, FullKey, ResourcePath};
pub use memory::InMemoryBackend;
pub use service::{CoordinationError, CoordinationService, LockHandle};
pub use traced::TracedBackend;
pub use types::{CellStatus, CounterValue, DegradedMode, LockToken};
