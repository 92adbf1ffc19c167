// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use parking_lot::Mutex;

use buildops_core::{
    BuildOperationType, LogEvent, LogLevel, OperationId, OutputEvent, Progress, ProgressComplete,
    ProgressOperationId, ProgressStart,
};

use super::{GroupingOutputPipeline, OutputListener};

#[derive(Default)]
struct RecordingOutputListener {
    batches: Mutex<Vec<Vec<OutputEvent>>>,
    passthrough: Mutex<Vec<OutputEvent>>,
}

impl RecordingOutputListener {
    fn batches(&self) -> Vec<Vec<OutputEvent>> {
        self.batches.lock().clone()
    }

    fn passthrough(&self) -> Vec<OutputEvent> {
        self.passthrough.lock().clone()
    }
}

impl OutputListener for RecordingOutputListener {
    fn on_output(&self, batch: Vec<OutputEvent>) {
        self.batches.lock().push(batch);
    }

    fn on_event(&self, event: OutputEvent) {
        self.passthrough.lock().push(event);
    }
}

fn progress_start(
    progress_id: i64,
    parent_progress_id: Option<i64>,
    build_op_id: i64,
    parent_build_op_id: Option<i64>,
    operation_type: BuildOperationType,
    description: &str,
) -> OutputEvent {
    OutputEvent::ProgressStart(ProgressStart {
        progress_operation_id: ProgressOperationId(progress_id),
        parent_progress_operation_id: parent_progress_id.map(ProgressOperationId),
        category: "org.example".to_string(),
        description: description.to_string(),
        short_description: None,
        logging_header: None,
        status: String::new(),
        build_operation_id: Some(OperationId(build_op_id)),
        parent_build_operation_id: parent_build_op_id.map(OperationId),
        operation_type,
    })
}

fn progress_complete(progress_id: i64, description: &str) -> OutputEvent {
    OutputEvent::ProgressComplete(ProgressComplete {
        progress_operation_id: ProgressOperationId(progress_id),
        category: "org.example".to_string(),
        description: description.to_string(),
        status: "UP-TO-DATE".to_string(),
    })
}

fn log_event(build_op_id: i64, message: &str) -> OutputEvent {
    OutputEvent::LogEvent(LogEvent {
        category: "org.example".to_string(),
        level: LogLevel::Info,
        message: message.to_string(),
        build_operation_id: Some(OperationId(build_op_id)),
        throwable: None,
    })
}

fn is_log_with_message(event: &OutputEvent, expected: &str) -> bool {
    matches!(event, OutputEvent::LogEvent(log) if log.message == expected)
}

fn is_blank_log(event: &OutputEvent) -> bool {
    matches!(event, OutputEvent::LogEvent(log) if log.message.is_empty())
}

// S5
#[test]
fn a_single_task_with_one_log_line_groups_into_a_five_event_batch() {
    let downstream = RecordingOutputListener::default();
    let pipeline = GroupingOutputPipeline::new(downstream);

    pipeline.handle(progress_start(1, None, 10, None, BuildOperationType::Task, ":compileFoo"));
    pipeline.handle(log_event(10, "Compiling 3 source files"));
    pipeline.handle(progress_complete(1, ":compileFoo"));

    let batches = pipeline.downstream.batches();
    assert_eq!(batches.len(), 1);
    let batch = &batches[0];
    assert_eq!(batch.len(), 5);
    assert!(is_log_with_message(&batch[0], "[:compileFoo]"));
    assert!(matches!(batch[1], OutputEvent::ProgressStart(_)));
    assert!(is_log_with_message(&batch[2], "Compiling 3 source files"));
    assert!(matches!(batch[3], OutputEvent::ProgressComplete(_)));
    assert!(is_blank_log(&batch[4]));
}

// S6
#[test]
fn a_nested_child_under_a_task_groups_into_a_seven_event_batch_preserving_order() {
    let downstream = RecordingOutputListener::default();
    let pipeline = GroupingOutputPipeline::new(downstream);

    pipeline.handle(progress_start(1, None, 10, None, BuildOperationType::Task, ":compileFoo"));
    pipeline.handle(progress_start(2, Some(1), 11, Some(10), BuildOperationType::Uncategorized, "Resolve classpath"));
    pipeline.handle(log_event(11, "Resolved 4 artifacts"));
    pipeline.handle(progress_complete(2, "Resolve classpath"));
    pipeline.handle(progress_complete(1, ":compileFoo"));

    let batches = pipeline.downstream.batches();
    assert_eq!(batches.len(), 1);
    let batch = &batches[0];
    assert_eq!(batch.len(), 7);
    assert!(is_log_with_message(&batch[0], "[:compileFoo]"));
    assert!(matches!(batch[1], OutputEvent::ProgressStart(_)), "task start");
    assert!(matches!(batch[2], OutputEvent::ProgressStart(_)), "child start");
    assert!(is_log_with_message(&batch[3], "Resolved 4 artifacts"));
    assert!(matches!(batch[4], OutputEvent::ProgressComplete(_)), "child complete");
    assert!(matches!(batch[5], OutputEvent::ProgressComplete(_)), "task complete");
    assert!(is_blank_log(&batch[6]));
}

// S7
#[test]
fn a_task_with_no_renderable_output_is_dropped_entirely() {
    let downstream = RecordingOutputListener::default();
    let pipeline = GroupingOutputPipeline::new(downstream);

    pipeline.handle(progress_start(1, None, 10, None, BuildOperationType::Task, ":noop"));
    pipeline.handle(OutputEvent::Progress(Progress {
        progress_operation_id: ProgressOperationId(1),
        status: "50%".to_string(),
    }));
    pipeline.handle(progress_complete(1, ":noop"));

    assert!(pipeline.downstream.batches().is_empty());
    assert!(pipeline.downstream.passthrough().is_empty());
}

// S8
#[test]
fn end_of_build_flushes_open_groups_and_keeps_them_open_for_further_output() {
    let downstream = RecordingOutputListener::default();
    let pipeline = GroupingOutputPipeline::new(downstream);

    pipeline.handle(progress_start(1, None, 10, None, BuildOperationType::ConfigureProject, "Configure project :lib"));
    pipeline.handle(log_event(10, "Evaluating build.gradle"));
    pipeline.handle(OutputEvent::EndOutput);

    {
        let batches = pipeline.downstream.batches();
        assert_eq!(batches.len(), 1);
        let batch = &batches[0];
        assert_eq!(batch.len(), 4);
        assert!(is_log_with_message(&batch[0], "[Configure project :lib]"));
        assert!(matches!(batch[1], OutputEvent::ProgressStart(_)));
        assert!(is_log_with_message(&batch[2], "Evaluating build.gradle"));
        assert!(is_blank_log(&batch[3]));
    }

    let passthrough = pipeline.downstream.passthrough();
    assert_eq!(passthrough.len(), 1);
    assert!(matches!(passthrough[0], OutputEvent::EndOutput));

    // The group is still open: further output for the same build operation
    // keeps accumulating rather than being treated as a fresh group.
    pipeline.handle(log_event(10, "Configuration complete"));
    pipeline.handle(progress_complete(1, "Configure project :lib"));

    let batches = pipeline.downstream.batches();
    assert_eq!(batches.len(), 2);
    let second = &batches[1];
    assert!(is_log_with_message(&second[0], "[Configure project :lib]"), "prefix restored after flush");
    assert!(matches!(second[1], OutputEvent::ProgressStart(_)));
    assert!(is_log_with_message(&second[2], "Configuration complete"));
    assert!(matches!(second[3], OutputEvent::ProgressComplete(_)));
    assert!(is_blank_log(&second[4]));
}

#[test]
fn an_event_with_no_build_operation_id_passes_straight_through() {
    let downstream = RecordingOutputListener::default();
    let pipeline = GroupingOutputPipeline::new(downstream);

    pipeline.handle(log_event_without_operation("stdout from an external process"));

    let passthrough = pipeline.downstream.passthrough();
    assert_eq!(passthrough.len(), 1);
    assert!(is_log_with_message(&passthrough[0], "stdout from an external process"));
}

fn log_event_without_operation(message: &str) -> OutputEvent {
    OutputEvent::LogEvent(LogEvent {
        category: String::new(),
        level: LogLevel::Info,
        message: message.to_string(),
        build_operation_id: None,
        throwable: None,
    })
}
