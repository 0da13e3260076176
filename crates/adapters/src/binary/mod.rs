// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Binary object storage (uploaded file contents)

mod noop;

pub use noop::NoOpBinaryStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeBinaryStore;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from binary store operations
#[derive(Debug, Error)]
pub enum BinaryStoreError {
    #[error("object {id} could not be removed: {reason}")]
    RemoveFailed { id: String, reason: String },
    #[error("binary store unavailable: {0}")]
    Unavailable(String),
}

/// Store holding the content of binary objects, addressed by record id
#[async_trait]
pub trait BinaryStore: Clone + Send + Sync + 'static {
    /// Remove one object. Removing an object that is already gone succeeds.
    async fn remove(&self, object_id: &str) -> Result<(), BinaryStoreError>;
}
