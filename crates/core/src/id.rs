// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation identifiers and the counters that mint them.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// Identifier for a single build operation, unique within one process run.
///
/// Positive ids are minted for normal operations by a monotonically
/// increasing counter. Negative ids are minted for synthetic "unmanaged
/// thread" parents by a separate monotonically decreasing counter. Id `0` is
/// reserved for the artificial root used by test fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct OperationId(pub i64);

impl OperationId {
    /// The artificial root id, reserved for the test-fixture root operation.
    pub const ROOT: OperationId = OperationId(0);

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }

    /// Unmanaged-thread parents always carry a negative id.
    pub fn is_unmanaged(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mints [`OperationId`] values for an executor.
///
/// One `IdGenerator` is owned by each executor instance; the two counters are
/// independent so normal and unmanaged-parent ids never collide (one side is
/// always positive, the other always negative).
pub struct IdGenerator {
    next_id: AtomicI64,
    next_unmanaged_id: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            next_unmanaged_id: AtomicI64::new(-1),
        }
    }

    /// Mint the next positive id for a normal operation.
    pub fn next_id(&self) -> OperationId {
        OperationId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Mint the next negative id for a synthetic unmanaged-thread parent.
    pub fn next_unmanaged_id(&self) -> OperationId {
        OperationId(self.next_unmanaged_id.fetch_sub(1, Ordering::Relaxed))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
