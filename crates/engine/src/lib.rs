// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cellgate deletion engine: tears down a cell's data behind the status gate

mod config;
mod deletion;
mod error;
mod runner;
pub mod telemetry;

pub use config::{DeletionConfig, Settings};
pub use deletion::{BulkDeletion, DeletionDeps, DeletionReport, EventLogOutcome, FailedRemoval};
pub use error::DeletionError;
pub use runner::{DeletionHandle, DeletionRunner};
