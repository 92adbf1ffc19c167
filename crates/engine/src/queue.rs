// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The bounded parallel dispatcher `run_all` hands to its `schedule`
//! callback (`spec.md` §4.2).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use buildops_core::{BuildOperationFailure, BuildOperationListener, Clock, OperationState, RunnableBuildOperation};

use crate::executor::{reset_current_operation_slot, ExecutorShared};
use crate::worker_pool::WorkerPool;

/// Fed by a `run_all` caller's `schedule` closure; every enqueued operation
/// runs the shared execution envelope (`spec.md` §4.1) on a pool worker,
/// under the parent captured when the queue was created.
pub struct OperationQueue<P, L, C>
where
    P: WorkerPool,
    L: BuildOperationListener,
    C: Clock,
{
    shared: Arc<ExecutorShared<L, C>>,
    pool: Arc<P>,
    default_parent: Option<Arc<OperationState>>,
    cancelled: Arc<AtomicBool>,
    failures: Arc<Mutex<Vec<BuildOperationFailure>>>,
    inflight: Arc<(Mutex<usize>, Condvar)>,
}

impl<P, L, C> OperationQueue<P, L, C>
where
    P: WorkerPool,
    L: BuildOperationListener + 'static,
    C: Clock + 'static,
{
    pub(crate) fn new(
        shared: Arc<ExecutorShared<L, C>>,
        pool: Arc<P>,
        default_parent: Option<Arc<OperationState>>,
    ) -> Self {
        Self {
            shared,
            pool,
            default_parent,
            cancelled: Arc::new(AtomicBool::new(false)),
            failures: Arc::new(Mutex::new(Vec::new())),
            inflight: Arc::new((Mutex::new(0), Condvar::new())),
        }
    }

    /// Make `op` eligible for pool execution. Non-blocking.
    pub fn enqueue(&self, op: impl RunnableBuildOperation + 'static) {
        {
            let mut pending = self.inflight.0.lock();
            *pending += 1;
        }

        let shared = Arc::clone(&self.shared);
        let default_parent = self.default_parent.clone();
        let cancelled = Arc::clone(&self.cancelled);
        let failures = Arc::clone(&self.failures);
        let inflight = Arc::clone(&self.inflight);

        self.pool.submit(Box::new(move || {
            if !cancelled.load(Ordering::Acquire) {
                let builder = op.description();
                if let Err(failure) = shared.execute(builder, default_parent, |ctx| op.run(ctx)) {
                    failures.lock().push(failure);
                }
            }

            reset_current_operation_slot();

            let mut pending = inflight.0.lock();
            *pending -= 1;
            if *pending == 0 {
                inflight.1.notify_all();
            }
        }));
    }

    /// Mark the queue so not-yet-started jobs are dropped. In-flight jobs
    /// continue to completion.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Record a failure outside the normal per-job path — used by
    /// [`crate::executor::BuildOperationExecutor::run_all`] to fold in a
    /// failure from the `schedule` callback itself.
    pub(crate) fn add_failure(&self, failure: BuildOperationFailure) {
        self.failures.lock().push(failure);
    }

    /// Block until every enqueued job has completed or been dropped. Raises
    /// the accrued failures per `spec.md` §4.2: zero stays `Ok`, one is
    /// raised directly, more than one becomes `Multiple`.
    pub fn wait_for_completion(self) -> Result<(), BuildOperationFailure> {
        {
            let mut pending = self.inflight.0.lock();
            while *pending > 0 {
                self.inflight.1.wait(&mut pending);
            }
        }

        let failures = std::mem::take(&mut *self.failures.lock());
        match BuildOperationFailure::combine(failures) {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
