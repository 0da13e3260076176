// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cg-core: coordination primitives for cellgate
//!
//! This crate provides:
//! - Cell identities and the coordination key namespace
//! - A pluggable coordination backend with an in-process implementation
//! - The coordination service façade and the cell status gate
//! - Configuration and clock/id abstractions for testable code

pub mod cell;
pub mod clock;
pub mod config;
pub mod coordination;
pub mod id;

// Re-exports
pub use cell::{Cell, CellId};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, CoordinationConfig, ExpiryPolicy};
pub use coordination::{
    Access, BackendError, BulkDeletionTicket, CellGate, CellStatus, CoordinationBackend,
    CoordinationError, CoordinationService, CounterValue, DegradedMode, FullKey, InMemoryBackend,
    LockHandle, LockToken, ResourcePath, TracedBackend,
};
pub use id::{HolderId, IdGen, SequentialIdGen, UuidIdGen};
