// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the stores a cell's data lives in

pub mod binary;
pub mod event_log;
pub mod storage;
pub mod traced;

pub use binary::{BinaryStore, BinaryStoreError, NoOpBinaryStore};
pub use event_log::{EventLogError, EventLogStore, NoOpEventLogStore};
pub use storage::{NoOpStorageAccessor, StorageAccessor, StorageError};
pub use traced::{TracedBinaryStore, TracedEventLogStore, TracedStorageAccessor};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use binary::FakeBinaryStore;
#[cfg(any(test, feature = "test-support"))]
pub use event_log::{EventLogCall, FakeEventLogStore};
#[cfg(any(test, feature = "test-support"))]
pub use storage::{FakeStorageAccessor, StorageCall};
