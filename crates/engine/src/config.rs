// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executor configuration.

/// Configuration an embedder feeds into [`crate::executor::BuildOperationExecutor`].
///
/// The core has no CLI or config-file loading surface (`spec.md` §1,
/// Non-goals), but a typed, `serde`-deserializable config struct is ordinary
/// ambient stack for a crate in this lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExecutorConfig {
    /// Number of worker threads backing `run_all` dispatch.
    pub max_workers: usize,
}

impl ExecutorConfig {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        let parallelism = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            max_workers: parallelism,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
