// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The listener sink the executor notifies of operation lifecycle events.

use std::time::Instant;

use crate::descriptor::BuildOperationDescriptor;
use crate::error::BuildOperationFailure;

/// Emitted just before a build operation's body runs.
#[derive(Debug, Clone, Copy)]
pub struct OperationStartEvent {
    pub start_time: Instant,
}

/// Emitted after a build operation's body returns, whether it succeeded or
/// failed. Always carries the true `start_time`/`end_time` from the clock,
/// independent of whether the current-operation slot has been restored yet.
#[derive(Debug, Clone)]
pub struct OperationFinishEvent {
    pub start_time: Instant,
    pub end_time: Instant,
    pub failure: Option<String>,
    pub result: Option<String>,
}

impl OperationFinishEvent {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

/// Receives `started`/`finished` pairs for every build operation the
/// executor runs. A pure sink: implementations must be thread-safe since the
/// executor may invoke them from any worker, and must not re-enter the
/// executor or pipeline from within a callback.
pub trait BuildOperationListener: Send + Sync {
    fn started(&self, descriptor: &BuildOperationDescriptor, event: OperationStartEvent);
    fn finished(&self, descriptor: &BuildOperationDescriptor, event: OperationFinishEvent);
}

/// A listener that does nothing, for callers that only care about the
/// operation lifecycle bookkeeping and not about observing it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl BuildOperationListener for NoopListener {
    fn started(&self, _descriptor: &BuildOperationDescriptor, _event: OperationStartEvent) {}
    fn finished(&self, _descriptor: &BuildOperationDescriptor, _event: OperationFinishEvent) {}
}

/// Helper to render a [`BuildOperationFailure`] for inclusion in a finish
/// event without forcing every listener to depend on the error type.
pub fn describe_failure(failure: &BuildOperationFailure) -> String {
    failure.to_string()
}
