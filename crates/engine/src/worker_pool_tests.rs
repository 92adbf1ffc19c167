// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;

#[test]
fn submitted_jobs_run_on_a_managed_worker() {
    let pool = ThreadWorkerPool::new(2);
    let (tx, rx) = std::sync::mpsc::channel();
    pool.submit(Box::new(move || {
        let _ = tx.send(is_managed_worker());
    }));
    let managed = rx.recv_timeout(Duration::from_secs(2)).expect("job ran");
    assert!(managed);
    pool.stop();
}

#[test]
fn all_submitted_jobs_eventually_run() {
    let pool = ThreadWorkerPool::new(4);
    let count = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(11));
    for _ in 0..10 {
        let count = Arc::clone(&count);
        let barrier = Arc::clone(&barrier);
        pool.submit(Box::new(move || {
            count.fetch_add(1, Ordering::SeqCst);
            barrier.wait();
        }));
    }
    barrier.wait();
    assert_eq!(count.load(Ordering::SeqCst), 10);
    pool.stop();
}

#[test]
fn the_calling_thread_is_never_reported_as_managed() {
    assert!(!is_managed_worker());
}
