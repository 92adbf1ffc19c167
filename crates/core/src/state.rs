// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mutable per-operation bookkeeping owned by the executor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::descriptor::BuildOperationDescriptor;

/// Mutable state for one in-flight (or completed) build operation.
///
/// A state is *running* from just before `started` is dispatched until just
/// after `finished`. Nested child states observe `parent.is_running() ==
/// true`; a violation of that is a programming error surfaced as
/// [`crate::error::BuildOperationFailure::ParentNotRunning`] /
/// `ParentCompletedEarly`.
///
/// Unmanaged-thread parents are modeled as a distinct constructor
/// ([`OperationState::unmanaged`]) rather than a boolean flag threaded
/// through every call site, per the design note in `spec.md` §9: it keeps
/// "is this the fabricated parent I should auto-close?" a single field
/// check at the one call site that cares
/// (`Executor::maybe_finish_unmanaged_parent`).
pub struct OperationState {
    pub descriptor: BuildOperationDescriptor,
    pub start_time: Instant,
    running: AtomicBool,
    is_unmanaged: bool,
}

impl OperationState {
    pub fn new(descriptor: BuildOperationDescriptor, start_time: Instant) -> Self {
        Self {
            descriptor,
            start_time,
            running: AtomicBool::new(false),
            is_unmanaged: false,
        }
    }

    /// Construct the state for a fabricated unmanaged-thread parent.
    pub fn unmanaged(descriptor: BuildOperationDescriptor, start_time: Instant) -> Self {
        Self {
            descriptor,
            start_time,
            running: AtomicBool::new(false),
            is_unmanaged: true,
        }
    }

    pub fn is_unmanaged(&self) -> bool {
        self.is_unmanaged
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn mark_running(&self) {
        self.running.store(true, Ordering::Release);
    }

    pub fn mark_finished(&self) {
        self.running.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for OperationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationState")
            .field("id", &self.descriptor.id)
            .field("display_name", &self.descriptor.display_name)
            .field("running", &self.is_running())
            .field("is_unmanaged", &self.is_unmanaged)
            .finish()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
