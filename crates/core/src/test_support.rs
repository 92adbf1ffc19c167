// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test doubles shared by `buildops-core` and `buildops-engine` tests.

use parking_lot::Mutex;

use crate::descriptor::BuildOperationDescriptor;
use crate::listener::{BuildOperationListener, OperationFinishEvent, OperationStartEvent};

/// One recorded lifecycle event, in arrival order.
#[derive(Debug, Clone)]
pub enum RecordedEvent {
    Started { id: i64, display_name: String },
    Finished { id: i64, failed: bool },
}

/// A [`BuildOperationListener`] that records every event it sees, in order,
/// behind a mutex so assertions can run from the test thread after the
/// executor has finished dispatching.
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    pub fn started_ids(&self) -> Vec<i64> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RecordedEvent::Started { id, .. } => Some(id),
                RecordedEvent::Finished { .. } => None,
            })
            .collect()
    }

    pub fn finished_ids(&self) -> Vec<i64> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RecordedEvent::Finished { id, .. } => Some(id),
                RecordedEvent::Started { .. } => None,
            })
            .collect()
    }
}

impl BuildOperationListener for RecordingListener {
    fn started(&self, descriptor: &BuildOperationDescriptor, _event: OperationStartEvent) {
        self.events.lock().push(RecordedEvent::Started {
            id: descriptor.id.0,
            display_name: descriptor.display_name.clone(),
        });
    }

    fn finished(&self, descriptor: &BuildOperationDescriptor, event: OperationFinishEvent) {
        self.events.lock().push(RecordedEvent::Finished {
            id: descriptor.id.0,
            failed: !event.succeeded(),
        });
    }
}
