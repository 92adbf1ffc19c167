// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types shared by the executor and the grouping output pipeline.

use thiserror::Error;

/// Everything that can go wrong executing or dispatching build operations.
///
/// The executor never swallows a failure: bookkeeping (the finish event,
/// current-operation slot restore, clearing the running flag) always
/// happens before one of these propagates out of `run`/`call`/`run_all`.
#[derive(Debug, Error)]
pub enum BuildOperationFailure {
    /// No current operation exists on this worker when one was required.
    #[error("no current build operation on this worker")]
    NoCurrentOperation,

    /// An artificial root was requested but this worker already has a
    /// current operation occupying its slot.
    #[error("cannot create an artificial root: a current operation is already running")]
    RootAlreadyRunning,

    /// A child operation's resolved parent was not running at start time.
    #[error("cannot add operation '{child}' as a child of '{parent}' because it is not running")]
    ParentNotRunning { parent: String, child: String },

    /// A child operation's parent finished before the child itself did.
    #[error("parent operation '{parent}' completed before its child '{child}' finished")]
    ParentCompletedEarly { parent: String, child: String },

    /// The body of a build operation failed.
    #[error("{0}")]
    Body(Box<dyn std::error::Error + Send + Sync>),

    /// The `schedule` callback passed to `run_all` itself failed before any
    /// jobs could be enqueued.
    #[error("failed to populate operation queue: {0}")]
    QueuePopulation(Box<dyn std::error::Error + Send + Sync>),

    /// Two or more failures accrued from one `run_all` batch.
    #[error("{}", join_causes(.0))]
    Multiple(Vec<BuildOperationFailure>),
}

/// The host platform's line separator (`spec.md` §6, Environment).
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

fn join_causes(causes: &[BuildOperationFailure]) -> String {
    causes
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(&format!("{LINE_SEPARATOR}AND{LINE_SEPARATOR}"))
}

impl BuildOperationFailure {
    /// Build a `Body` failure from any standard error.
    pub fn body(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Body(Box::new(err))
    }

    /// Combine a list of failures per `spec.md` §4.2: zero failures has no
    /// representation here (callers check `is_empty()` themselves), exactly
    /// one failure is returned unwrapped, more than one becomes `Multiple`.
    pub fn combine(mut causes: Vec<BuildOperationFailure>) -> Option<BuildOperationFailure> {
        match causes.len() {
            0 => None,
            1 => Some(causes.remove(0)),
            _ => Some(BuildOperationFailure::Multiple(causes)),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
