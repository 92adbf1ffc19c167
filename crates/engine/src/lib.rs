// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! buildops-engine: the build operation executor, its parallel operation
//! queue, the default thread-backed worker pool, and the grouping output
//! pipeline described in `spec.md` §4.

pub mod config;
pub mod executor;
pub mod pipeline;
pub mod queue;
pub mod worker_pool;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::ExecutorConfig;
pub use executor::BuildOperationExecutor;
pub use pipeline::{GroupingOutputPipeline, OutputListener};
pub use queue::OperationQueue;
pub use worker_pool::{is_managed_worker, ThreadWorkerPool, WorkerPool};

#[cfg(any(test, feature = "test-support"))]
pub use test_support::FakeWorkerPool;
