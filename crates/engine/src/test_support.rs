// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test doubles for `buildops-engine`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::worker_pool::{run_as_managed_worker, WorkerPool};

/// A [`WorkerPool`] that runs every submitted job inline, on the calling
/// thread, recording submission order. A deterministic stand-in for
/// [`crate::worker_pool::ThreadWorkerPool`] in tests that need predictable
/// scheduling rather than real concurrency.
#[derive(Default)]
pub struct FakeWorkerPool {
    submitted: AtomicUsize,
    stopped: AtomicBool,
    order: Mutex<Vec<usize>>,
}

impl FakeWorkerPool {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn submitted_count(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn call_order(&self) -> Vec<usize> {
        self.order.lock().clone()
    }
}

impl WorkerPool for FakeWorkerPool {
    fn submit(&self, job: Box<dyn FnOnce() + Send>) {
        let index = self.submitted.fetch_add(1, Ordering::SeqCst);
        self.order.lock().push(index);
        run_as_managed_worker(job);
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }
}
