// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The bounded thread pool the executor dispatches parallel jobs onto.
//!
//! `spec.md` §1 treats the pool as an external collaborator: "assumed
//! available as an `Executor` that accepts jobs and can be stopped". This
//! module defines that collaborator as a trait plus the one concrete
//! implementation the crate ships, grounded on the `Message::Run`/`Message::
//! Close` + channel shape used by thread-pool implementations in the wild
//! (e.g. a futures-style `ThreadPool`).

use std::cell::Cell;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Receiver, Sender};

thread_local! {
    /// Set to `true` on entry to every thread spawned by a [`ThreadWorkerPool`].
    /// The executor's unmanaged-thread fabrication (`spec.md` §4.1, §5) reads
    /// this to tell pool workers apart from externally-entering callers.
    static IS_POOL_WORKER: Cell<bool> = const { Cell::new(false) };
}

/// Whether the calling thread was spawned by a [`ThreadWorkerPool`].
pub fn is_managed_worker() -> bool {
    IS_POOL_WORKER.with(|flag| flag.get())
}

/// Run `f` with this thread marked as a managed pool worker for its
/// duration, restoring the prior value afterward. Lets a test-fixture pool
/// (e.g. `FakeWorkerPool`) emulate pool-worker identity without spawning
/// real threads.
pub fn run_as_managed_worker<R>(f: impl FnOnce() -> R) -> R {
    let previous = IS_POOL_WORKER.with(|flag| flag.replace(true));
    let result = f();
    IS_POOL_WORKER.with(|flag| flag.set(previous));
    result
}

/// A bounded pool that runs submitted jobs on worker threads.
pub trait WorkerPool: Send + Sync {
    /// Submit a job for execution on some pool worker. Non-blocking.
    fn submit(&self, job: Box<dyn FnOnce() + Send>);

    /// Stop the pool: rejects no in-flight work, accepts no further jobs.
    fn stop(&self);
}

enum Message {
    Run(Box<dyn FnOnce() + Send>),
    Close,
}

/// A fixed-size pool of `std::thread` workers draining a shared channel.
pub struct ThreadWorkerPool {
    tx: Sender<Message>,
    handles: parking_lot::Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadWorkerPool {
    #[allow(clippy::expect_used)]
    pub fn new(size: usize) -> Arc<Self> {
        let (tx, rx): (Sender<Message>, Receiver<Message>) = unbounded();
        let mut handles = Vec::with_capacity(size);
        for index in 0..size.max(1) {
            let rx = rx.clone();
            let handle = std::thread::Builder::new()
                .name(format!("buildops-worker-{index}"))
                .spawn(move || {
                    IS_POOL_WORKER.with(|flag| flag.set(true));
                    while let Ok(message) = rx.recv() {
                        match message {
                            Message::Run(job) => job(),
                            Message::Close => break,
                        }
                    }
                })
                .expect("OS refused to spawn a pool worker thread");
            handles.push(handle);
        }
        Arc::new(Self {
            tx,
            handles: parking_lot::Mutex::new(handles),
        })
    }
}

impl WorkerPool for ThreadWorkerPool {
    fn submit(&self, job: Box<dyn FnOnce() + Send>) {
        // A closed channel means `stop()` already ran; silently drop, since
        // submitting after stop is a caller error this layer does not
        // police (the queue above is what enforces cancellation semantics).
        let _ = self.tx.send(Message::Run(job));
    }

    fn stop(&self) {
        for _ in self.handles.lock().iter() {
            let _ = self.tx.send(Message::Close);
        }
        for handle in self.handles.lock().drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
#[path = "worker_pool_tests.rs"]
mod tests;
