// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use buildops_core::{BuildOperationFailure, RecordingListener, RunnableFn};

use crate::executor::BuildOperationExecutor;
use crate::worker_pool::{ThreadWorkerPool, WorkerPool};

#[derive(Debug)]
struct Boom;

impl std::fmt::Display for Boom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "boom")
    }
}

impl std::error::Error for Boom {}

fn executor_with_pool(size: usize) -> (BuildOperationExecutor<ThreadWorkerPool, RecordingListener, buildops_core::FakeClock>, Arc<ThreadWorkerPool>) {
    let pool = ThreadWorkerPool::new(size);
    let executor = BuildOperationExecutor::new(Arc::clone(&pool), RecordingListener::new(), buildops_core::FakeClock::new());
    (executor, pool)
}

#[test]
fn jobs_enqueued_after_cancel_never_run_their_body() {
    let (executor, pool) = executor_with_pool(2);
    let ran = Arc::new(AtomicUsize::new(0));

    let ran_in_job = Arc::clone(&ran);
    let result = executor.run_all(|queue| {
        queue.cancel();
        queue.enqueue(RunnableFn::new("Execute :a", move |_ctx| {
            ran_in_job.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
        Ok(())
    });

    assert!(result.is_ok());
    assert_eq!(ran.load(Ordering::SeqCst), 0);
    pool.stop();
}

#[test]
fn failures_from_many_concurrently_dispatched_jobs_are_all_collected() {
    let (executor, pool) = executor_with_pool(4);

    let result = executor.run_all(|queue| {
        for i in 0..5 {
            queue.enqueue(RunnableFn::new(format!("Execute :job-{i}"), |_ctx| {
                Err(BuildOperationFailure::body(Boom))
            }));
        }
        Ok(())
    });

    match result {
        Err(BuildOperationFailure::Multiple(causes)) => assert_eq!(causes.len(), 5),
        other => panic!("expected Multiple with 5 causes, got {other:?}"),
    }
    pool.stop();
}

#[test]
fn a_batch_with_no_enqueued_jobs_completes_immediately_with_no_failure() {
    let (executor, pool) = executor_with_pool(1);
    let result = executor.run_all(|_queue| Ok(()));
    assert!(result.is_ok());
    pool.stop();
}

#[test]
fn successful_jobs_alongside_a_single_failure_still_raise_it_directly() {
    let (executor, pool) = executor_with_pool(3);
    let successes = Arc::new(AtomicUsize::new(0));

    let successes_a = Arc::clone(&successes);
    let successes_b = Arc::clone(&successes);
    let result = executor.run_all(|queue| {
        queue.enqueue(RunnableFn::new("Execute :a", move |_ctx| {
            successes_a.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
        queue.enqueue(RunnableFn::new("Execute :b", move |_ctx| {
            successes_b.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
        queue.enqueue(RunnableFn::new("Execute :c", |_ctx| Err(BuildOperationFailure::body(Boom))));
        Ok(())
    });

    match result {
        Err(BuildOperationFailure::Body(cause)) => assert_eq!(cause.to_string(), "boom"),
        other => panic!("expected Body, got {other:?}"),
    }
    assert_eq!(successes.load(Ordering::SeqCst), 2);
    pool.stop();
}
