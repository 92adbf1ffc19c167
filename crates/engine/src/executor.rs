// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The build operation executor: synchronous `run`/`call` dispatch, parallel
//! `run_all` dispatch via [`crate::queue::OperationQueue`], the per-worker
//! current-operation slot, and unmanaged-thread parent fabrication.
//!
//! Grounded on `oj-engine::executor`'s tracing-wrapped dispatch shape
//! (`spec.md` §4.1 maps onto the same start/invoke/finish envelope
//! `Executor::execute` uses there, generalized from a fixed `Effect` enum to
//! an arbitrary operation body).

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use buildops_core::{
    describe_failure, BuildOperationContext, BuildOperationDescriptor,
    BuildOperationDescriptorBuilder, BuildOperationFailure, BuildOperationListener,
    BuildOperationType, CallableBuildOperation, Clock, IdGenerator, NoopListener,
    NoopProgressLoggerFactory, OperationFinishEvent, OperationId, OperationStartEvent,
    OperationState, ProgressLoggerFactory, RunnableBuildOperation, SystemClock,
};

use crate::queue::OperationQueue;
use crate::worker_pool::{is_managed_worker, WorkerPool};

thread_local! {
    /// The operation lexically wrapping the work currently executing on
    /// this worker (`spec.md` §3, Current-Operation Slot). Saved and
    /// restored around every envelope invocation so nested calls and
    /// exceptional exits never leak a stale value.
    static CURRENT_OPERATION: RefCell<Option<Arc<OperationState>>> = const { RefCell::new(None) };

    /// The synthetic unmanaged-thread parent for this worker, if one has
    /// been fabricated, plus a reentrancy count. Cleared once the count
    /// returns to zero (`spec.md` §4.1, Unmanaged-thread parent fabrication).
    static UNMANAGED_PARENT: RefCell<Option<(Arc<OperationState>, u32)>> = const { RefCell::new(None) };
}

/// Read the calling worker's current operation, if any.
pub(crate) fn current_operation_slot() -> Option<Arc<OperationState>> {
    CURRENT_OPERATION.with(|cell| cell.borrow().clone())
}

/// Reset the calling worker's current-operation slot to empty. Used by
/// [`crate::queue::OperationQueue`] after each job so a pool worker never
/// carries a stale operation into the next job it picks up (`spec.md` §4.1,
/// "A pool worker's own current-operation slot is restored to `null` after
/// each job").
pub(crate) fn reset_current_operation_slot() {
    CURRENT_OPERATION.with(|cell| *cell.borrow_mut() = None);
}

/// State and collaborators shared between [`BuildOperationExecutor`] and the
/// [`OperationQueue`]s it hands out to `run_all` callers.
pub(crate) struct ExecutorShared<L, C> {
    ids: IdGenerator,
    listener: L,
    clock: C,
    progress_logger: Arc<dyn ProgressLoggerFactory>,
}

impl<L, C> ExecutorShared<L, C>
where
    L: BuildOperationListener,
    C: Clock,
{
    fn acquire_unmanaged_parent(&self) -> Arc<OperationState> {
        UNMANAGED_PARENT.with(|cell| {
            let mut slot = cell.borrow_mut();
            if let Some((state, count)) = slot.as_mut() {
                *count += 1;
                return Arc::clone(state);
            }

            let id = self.ids.next_unmanaged_id();
            let start_time = self.clock.now();
            let thread_name = std::thread::current()
                .name()
                .unwrap_or("unnamed")
                .to_string();
            let descriptor = BuildOperationDescriptor {
                id,
                parent_id: None,
                display_name: format!("Unmanaged thread operation #{id} ({thread_name})"),
                progress_display_name: None,
                operation_type: BuildOperationType::Uncategorized,
            };
            let state = Arc::new(OperationState::unmanaged(descriptor.clone(), start_time));
            state.mark_running();
            self.listener
                .started(&descriptor, OperationStartEvent { start_time });
            *slot = Some((Arc::clone(&state), 1));
            state
        })
    }

    /// Release one reentrant use of the unmanaged parent fabricated for this
    /// worker. Once the count returns to zero, emits its `finished` event
    /// and clears the slot.
    fn release_unmanaged_parent(&self) {
        let finished = UNMANAGED_PARENT.with(|cell| {
            let mut slot = cell.borrow_mut();
            match slot.as_mut() {
                Some((_, count)) if *count > 1 => {
                    *count -= 1;
                    None
                }
                Some(_) => slot.take().map(|(state, _)| state),
                None => None,
            }
        });

        if let Some(state) = finished {
            state.mark_finished();
            let end_time = self.clock.now();
            self.listener.finished(
                &state.descriptor,
                OperationFinishEvent {
                    start_time: state.start_time,
                    end_time,
                    failure: None,
                    result: None,
                },
            );
        }
    }

    /// The execution envelope shared by `run`, `call`, and every job an
    /// [`OperationQueue`] dispatches onto a pool worker (`spec.md` §4.1).
    ///
    /// `default_parent` is the parent to fall back on when neither the
    /// descriptor nor this worker's current-operation slot names one — for
    /// `run`/`call` that is simply `None` (the slot already covers it), for
    /// a queue job it is the parent captured at the `run_all` call site.
    pub(crate) fn execute<T: std::fmt::Debug>(
        &self,
        builder: BuildOperationDescriptorBuilder,
        default_parent: Option<Arc<OperationState>>,
        body: impl FnOnce(&BuildOperationContext<T>) -> Result<T, BuildOperationFailure>,
    ) -> Result<T, BuildOperationFailure> {
        let prior = current_operation_slot();

        let mut parent = builder
            .explicit_parent()
            .or_else(|| prior.clone())
            .or(default_parent);

        let mut used_unmanaged = false;
        if parent.is_none() && !is_managed_worker() {
            parent = Some(self.acquire_unmanaged_parent());
            used_unmanaged = true;
        }

        if let Some(p) = parent.as_ref() {
            if !p.is_running() {
                if used_unmanaged {
                    self.release_unmanaged_parent();
                }
                return Err(BuildOperationFailure::ParentNotRunning {
                    parent: p.descriptor.display_name.clone(),
                    child: builder.display_name().to_string(),
                });
            }
        }

        let id = self.ids.next_id();
        let start_time = self.clock.now();
        let descriptor = builder.build(id, parent.as_ref());
        let state = Arc::new(OperationState::new(descriptor.clone(), start_time));
        state.mark_running();

        CURRENT_OPERATION.with(|cell| *cell.borrow_mut() = Some(Arc::clone(&state)));

        tracing::debug!(
            operation_id = descriptor.id.0,
            parent_id = descriptor.parent_id.map(|p| p.0),
            display_name = %descriptor.display_name,
            "build operation started"
        );
        self.listener
            .started(&descriptor, OperationStartEvent { start_time });

        let progress_scope = descriptor
            .progress_display_name
            .as_deref()
            .map(|name| self.progress_logger.start(name));

        let ctx = BuildOperationContext::new();
        let body_result = body(&ctx);

        if let Some(scope) = progress_scope {
            scope.close();
        }

        let parent_completed_early = parent.as_ref().is_some_and(|p| !p.is_running());
        let end_time = self.clock.now();

        let final_result = if parent_completed_early {
            Err(BuildOperationFailure::ParentCompletedEarly {
                parent: parent.as_ref().map(|p| p.descriptor.display_name.clone()).unwrap_or_default(),
                child: descriptor.display_name.clone(),
            })
        } else {
            body_result
        };

        // spec.md §4.1 step 11: the finish event carries `context.failure`/
        // `context.result` — what the body explicitly recorded via
        // `ctx.fail`/`ctx.set_result` — not the closure's return value. A
        // thrown failure (an `Err` the body returned instead of calling
        // `ctx.fail` itself) is still folded in here per step 9, so it
        // reaches the listener even though the body never touched `ctx`.
        let failure_description = if parent_completed_early {
            final_result.as_ref().err().map(describe_failure)
        } else {
            match ctx.take_failure() {
                Some(failure) => Some(describe_failure(&failure)),
                None => final_result.as_ref().err().map(describe_failure),
            }
        };
        let result_description = if parent_completed_early {
            None
        } else {
            ctx.take_result().map(|value| format!("{value:?}"))
        };
        let elapsed_ms = end_time.duration_since(start_time).as_millis() as u64;

        self.listener.finished(
            &descriptor,
            OperationFinishEvent {
                start_time,
                end_time,
                failure: failure_description,
                result: result_description,
            },
        );

        match &final_result {
            Ok(_) => tracing::debug!(
                operation_id = descriptor.id.0,
                display_name = %descriptor.display_name,
                elapsed_ms,
                "build operation finished"
            ),
            Err(e) => tracing::warn!(
                operation_id = descriptor.id.0,
                display_name = %descriptor.display_name,
                elapsed_ms,
                error = %e,
                "build operation failed"
            ),
        }

        state.mark_finished();
        CURRENT_OPERATION.with(|cell| *cell.borrow_mut() = prior);

        if used_unmanaged {
            self.release_unmanaged_parent();
        }

        final_result
    }
}

/// Runs build operations on the caller's thread (`run`/`call`) or across a
/// bounded pool (`run_all`), notifying a [`BuildOperationListener`] of every
/// start/finish pair (`spec.md` §4.1).
pub struct BuildOperationExecutor<P, L = NoopListener, C = SystemClock>
where
    P: WorkerPool,
    L: BuildOperationListener,
    C: Clock,
{
    shared: Arc<ExecutorShared<L, C>>,
    pool: Arc<P>,
    stopped: AtomicBool,
}

impl<P, L, C> BuildOperationExecutor<P, L, C>
where
    P: WorkerPool,
    L: BuildOperationListener + 'static,
    C: Clock + 'static,
{
    pub fn new(pool: Arc<P>, listener: L, clock: C) -> Self {
        Self::with_progress_logger(pool, listener, clock, Arc::new(NoopProgressLoggerFactory))
    }

    pub fn with_progress_logger(
        pool: Arc<P>,
        listener: L,
        clock: C,
        progress_logger: Arc<dyn ProgressLoggerFactory>,
    ) -> Self {
        Self {
            shared: Arc::new(ExecutorShared {
                ids: IdGenerator::new(),
                listener,
                clock,
                progress_logger,
            }),
            pool,
            stopped: AtomicBool::new(false),
        }
    }

    /// Execute a void operation synchronously on the calling worker.
    pub fn run(&self, op: impl RunnableBuildOperation) -> Result<(), BuildOperationFailure> {
        let builder = op.description();
        self.shared.execute(builder, None, |ctx| op.run(ctx))
    }

    /// Execute an operation synchronously on the calling worker, returning
    /// its result.
    pub fn call<T: std::fmt::Debug>(
        &self,
        op: impl CallableBuildOperation<T>,
    ) -> Result<T, BuildOperationFailure> {
        let builder = op.description();
        self.shared.execute(builder, None, |ctx| op.call(ctx))
    }

    /// Dispatch a batch of operations across the pool. `schedule` populates
    /// the queue; every enqueued job runs under the caller's current
    /// operation as its default parent, captured once before any job runs
    /// (`spec.md` §4.1, Parent-preserving parallel dispatch).
    pub fn run_all(
        &self,
        schedule: impl FnOnce(&OperationQueue<P, L, C>) -> Result<(), BuildOperationFailure>,
    ) -> Result<(), BuildOperationFailure> {
        let default_parent = current_operation_slot();
        let queue = OperationQueue::new(Arc::clone(&self.shared), Arc::clone(&self.pool), default_parent);

        if let Err(failure) = schedule(&queue) {
            queue.add_failure(BuildOperationFailure::QueuePopulation(Box::new(failure)));
            queue.cancel();
        }

        queue.wait_for_completion()
    }

    /// The operation currently wrapping the calling worker, if any.
    pub fn current_operation(&self) -> Result<Arc<OperationState>, BuildOperationFailure> {
        current_operation_slot().ok_or(BuildOperationFailure::NoCurrentOperation)
    }

    /// Create the artificial root used by test fixtures that need to
    /// pretend a build is ongoing (`spec.md` §4.1, Artificial root).
    /// Preconditions on the calling worker having no current operation.
    pub fn create_artificial_root(&self) -> Result<Arc<OperationState>, BuildOperationFailure> {
        if current_operation_slot().is_some() {
            return Err(BuildOperationFailure::RootAlreadyRunning);
        }

        let start_time = self.shared.clock.now();
        let descriptor = BuildOperationDescriptor {
            id: OperationId::ROOT,
            parent_id: None,
            display_name: "Root build operation".to_string(),
            progress_display_name: None,
            operation_type: BuildOperationType::Uncategorized,
        };
        let state = Arc::new(OperationState::new(descriptor.clone(), start_time));
        state.mark_running();
        CURRENT_OPERATION.with(|cell| *cell.borrow_mut() = Some(Arc::clone(&state)));
        self.shared
            .listener
            .started(&descriptor, OperationStartEvent { start_time });
        Ok(state)
    }

    /// Stop the underlying pool. Rejects no in-flight work but accepts no
    /// further parallel batches.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
        self.pool.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
