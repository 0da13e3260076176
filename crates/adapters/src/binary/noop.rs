// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op binary store for deployments without file uploads.

use super::{BinaryStore, BinaryStoreError};
use async_trait::async_trait;

/// Binary store that holds nothing; every removal succeeds.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpBinaryStore;

impl NoOpBinaryStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BinaryStore for NoOpBinaryStore {
    async fn remove(&self, _object_id: &str) -> Result<(), BinaryStoreError> {
        Ok(())
    }
}
