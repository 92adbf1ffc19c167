// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The grouping output pipeline: reorganizes a stream of progress/log events
//! so everything beneath a grouping operation (a task or project
//! configuration) is buffered and emitted as one contiguous block when the
//! group completes (`spec.md` §4.3).
//!
//! Grounded on `oj-engine::job_logger`'s per-entity buffering/flush shape,
//! generalized from append-only files to an in-memory buffer keyed by
//! operation id and flushed downstream as a batch.

use std::collections::HashMap;

use indexmap::IndexMap;
use parking_lot::Mutex;

use buildops_core::{LogEvent, OperationId, OutputEvent, ProgressOperationId};

/// The downstream sink a [`GroupingOutputPipeline`] forwards to: a terminal
/// renderer or file logger in a real embedder, a recording fake in tests.
/// Calls happen while the pipeline's mutex is held — implementations must
/// not re-enter the pipeline (`spec.md` §5).
pub trait OutputListener: Send + Sync {
    /// A group's buffered contents, emitted as one contiguous block.
    fn on_output(&self, batch: Vec<OutputEvent>);

    /// A single event that never belonged to a group (or an `EndOutput`
    /// marker), forwarded immediately.
    fn on_event(&self, event: OutputEvent);
}

/// One group's buffered contents. `prefix` is the synthetic header plus the
/// `ProgressStart` that opened the group — fixed at creation, restored after
/// every flush so a later flush of the same still-open group reads as a
/// continuation rather than a repeat.
struct GroupBuffer {
    prefix: Vec<OutputEvent>,
    events: Vec<OutputEvent>,
}

impl GroupBuffer {
    fn new(header: OutputEvent, start_event: OutputEvent) -> Self {
        let prefix = vec![header, start_event];
        Self {
            events: prefix.clone(),
            prefix,
        }
    }

    fn push(&mut self, event: OutputEvent) {
        self.events.push(event);
    }

    /// Whether anything beyond the header counts as user-visible output
    /// (`spec.md` §4.3, renderability test).
    fn is_renderable(&self) -> bool {
        self.events.iter().skip(1).any(OutputEvent::is_renderable)
    }

    /// Drain the buffered events, resetting it to just the original prefix.
    fn take(&mut self) -> Vec<OutputEvent> {
        std::mem::replace(&mut self.events, self.prefix.clone())
    }
}

#[derive(Default)]
struct Inner {
    /// `childId -> parentId`, populated from every `ProgressStart` that
    /// carries a build operation id (`spec.md` §3, Operation Id Forest).
    forest: HashMap<OperationId, Option<OperationId>>,
    /// `progressOperationId -> buildOperationId`.
    progress_map: HashMap<ProgressOperationId, OperationId>,
    /// Groups still open, in the order they were opened.
    groups: IndexMap<OperationId, GroupBuffer>,
    last_rendered: Option<OperationId>,
}

impl Inner {
    /// Walk upward from `op_id` through the forest; append to the first
    /// open group found. Forwards directly downstream if the walk reaches
    /// the root with no hit (`spec.md` §4.3, group-or-forward).
    fn group_or_forward(&mut self, op_id: OperationId, event: OutputEvent, downstream: &dyn OutputListener) {
        let mut current = Some(op_id);
        while let Some(id) = current {
            if let Some(buffer) = self.groups.get_mut(&id) {
                buffer.push(event);
                return;
            }
            current = self.forest.get(&id).copied().flatten();
        }
        downstream.on_event(event);
    }

    /// Close a group on its `ProgressComplete`. Drops it silently if it
    /// never accrued renderable output.
    fn close_group(&mut self, group_id: OperationId, complete_event: OutputEvent, downstream: &dyn OutputListener) {
        let Some(mut buffer) = self.groups.shift_remove(&group_id) else {
            return;
        };

        if !buffer.is_renderable() {
            return;
        }

        buffer.push(complete_event);
        buffer.push(OutputEvent::LogEvent(LogEvent::blank()));
        downstream.on_output(buffer.events);
        self.last_rendered = Some(group_id);
    }

    /// Flush every still-open, non-empty group in insertion order. Unlike
    /// [`Self::close_group`], the group stays open afterward — only its
    /// buffer resets to the original header (`spec.md` §4.3, Flush-all).
    fn flush_all(&mut self, downstream: &dyn OutputListener) {
        let group_ids: Vec<OperationId> = self.groups.keys().copied().collect();
        for group_id in group_ids {
            let Some(buffer) = self.groups.get_mut(&group_id) else {
                continue;
            };
            if !buffer.is_renderable() {
                continue;
            }

            if self.last_rendered != Some(group_id) {
                buffer.push(OutputEvent::LogEvent(LogEvent::blank()));
            }

            let batch = buffer.take();
            downstream.on_output(batch);
            self.last_rendered = Some(group_id);
        }
    }
}

/// Consumes a heterogeneous event stream keyed by operation id, buffering
/// events belonging to a grouping ancestor until it completes. Everything
/// else passes through immediately. One coarse mutex guards all state
/// (`spec.md` §5, Mutex granularity).
pub struct GroupingOutputPipeline<D: OutputListener> {
    downstream: D,
    inner: Mutex<Inner>,
}

impl<D: OutputListener> GroupingOutputPipeline<D> {
    pub fn new(downstream: D) -> Self {
        Self {
            downstream,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// The downstream sink this pipeline forwards to.
    pub fn downstream(&self) -> &D {
        &self.downstream
    }

    /// Feed one upstream event into the pipeline, in arrival order.
    pub fn handle(&self, event: OutputEvent) {
        let mut inner = self.inner.lock();

        match event {
            OutputEvent::EndOutput => {
                inner.flush_all(&self.downstream);
                self.downstream.on_event(OutputEvent::EndOutput);
            }

            OutputEvent::ProgressStart(start) => {
                let build_operation_id = start.build_operation_id;
                let parent_build_operation_id = start.parent_build_operation_id;
                let progress_operation_id = start.progress_operation_id;
                let operation_type = start.operation_type;
                let category = start.category.clone();
                let description = start.description.clone();
                let event = OutputEvent::ProgressStart(start);

                let Some(build_op_id) = build_operation_id else {
                    self.downstream.on_event(event);
                    return;
                };

                inner.forest.insert(build_op_id, parent_build_operation_id);
                inner.progress_map.insert(progress_operation_id, build_op_id);

                if operation_type.is_grouping() {
                    let header = OutputEvent::LogEvent(LogEvent::header(category, &description, build_op_id));
                    inner.groups.insert(build_op_id, GroupBuffer::new(header, event));
                } else {
                    inner.group_or_forward(build_op_id, event, &self.downstream);
                }
            }

            OutputEvent::Progress(ref progress) => {
                match inner.progress_map.get(&progress.progress_operation_id).copied() {
                    Some(op_id) => inner.group_or_forward(op_id, event, &self.downstream),
                    None => self.downstream.on_event(event),
                }
            }

            OutputEvent::LogEvent(ref log) => match log.build_operation_id {
                Some(op_id) => inner.group_or_forward(op_id, event, &self.downstream),
                None => self.downstream.on_event(event),
            },

            OutputEvent::StyledTextOutput(ref styled) => match styled.build_operation_id {
                Some(op_id) => inner.group_or_forward(op_id, event, &self.downstream),
                None => self.downstream.on_event(event),
            },

            OutputEvent::ProgressComplete(ref complete) => {
                match inner.progress_map.get(&complete.progress_operation_id).copied() {
                    Some(op_id) if inner.groups.contains_key(&op_id) => {
                        inner.close_group(op_id, event, &self.downstream);
                    }
                    Some(op_id) => inner.group_or_forward(op_id, event, &self.downstream),
                    None => self.downstream.on_event(event),
                }
            }

            // Opaque passthrough kinds not enumerated above forward unchanged,
            // regardless of any build operation id they carry (`spec.md` §4.3,
            // "Any other event").
            OutputEvent::Other(_) => self.downstream.on_event(event),
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
