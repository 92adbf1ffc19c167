// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire-level output event types consumed and forwarded by the grouping
//! output pipeline.

use crate::descriptor::BuildOperationType;
use crate::id::OperationId;

/// Opaque, process-local identifier for a progress-tracking entity. A
/// separate identity space from [`OperationId`] — the pipeline maintains a
/// mapping from one to the other (`spec.md` GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgressOperationId(pub i64);

/// Severity level of a [`LogEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Quiet,
    Info,
    Warn,
    Error,
}

/// A heterogeneous event in the output stream, keyed (where applicable) by a
/// build operation id for hierarchical grouping.
#[derive(Debug, Clone)]
pub enum OutputEvent {
    ProgressStart(ProgressStart),
    Progress(Progress),
    ProgressComplete(ProgressComplete),
    LogEvent(LogEvent),
    StyledTextOutput(StyledTextOutput),
    EndOutput,
    /// Any other passthrough kind not interpreted by the pipeline.
    Other(OtherEvent),
}

#[derive(Debug, Clone)]
pub struct ProgressStart {
    pub progress_operation_id: ProgressOperationId,
    pub parent_progress_operation_id: Option<ProgressOperationId>,
    pub category: String,
    pub description: String,
    pub short_description: Option<String>,
    pub logging_header: Option<String>,
    pub status: String,
    pub build_operation_id: Option<OperationId>,
    pub parent_build_operation_id: Option<OperationId>,
    pub operation_type: BuildOperationType,
}

#[derive(Debug, Clone)]
pub struct Progress {
    pub progress_operation_id: ProgressOperationId,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct ProgressComplete {
    pub progress_operation_id: ProgressOperationId,
    pub category: String,
    pub description: String,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct LogEvent {
    pub category: String,
    pub level: LogLevel,
    pub message: String,
    pub build_operation_id: Option<OperationId>,
    pub throwable: Option<String>,
}

impl LogEvent {
    /// Construct the synthetic `[<description>]` header a group opens with.
    pub fn header(category: impl Into<String>, description: &str, build_operation_id: OperationId) -> Self {
        Self {
            category: category.into(),
            level: LogLevel::Quiet,
            message: format!("[{description}]"),
            build_operation_id: Some(build_operation_id),
            throwable: None,
        }
    }

    /// Construct the blank trailer line appended after a closed group.
    pub fn blank() -> Self {
        Self {
            category: String::new(),
            level: LogLevel::Quiet,
            message: String::new(),
            build_operation_id: None,
            throwable: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StyledTextOutput {
    pub build_operation_id: Option<OperationId>,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct OtherEvent {
    pub kind: String,
    pub build_operation_id: Option<OperationId>,
}

impl OutputEvent {
    /// The build operation id this event is keyed on, if any. Used to walk
    /// the operation id forest when deciding which group an event belongs
    /// to (`spec.md` §4.3, group-or-forward).
    pub fn build_operation_id(&self) -> Option<OperationId> {
        match self {
            OutputEvent::ProgressStart(e) => e.build_operation_id,
            OutputEvent::LogEvent(e) => e.build_operation_id,
            OutputEvent::StyledTextOutput(e) => e.build_operation_id,
            OutputEvent::Other(e) => e.build_operation_id,
            OutputEvent::Progress(_) | OutputEvent::ProgressComplete(_) | OutputEvent::EndOutput => None,
        }
    }

    /// Whether this event, if it ended up inside a group, would count as
    /// user-visible renderable output beyond progress bookkeeping
    /// (`spec.md` §4.3, renderability test).
    pub fn is_renderable(&self) -> bool {
        matches!(
            self,
            OutputEvent::LogEvent(_) | OutputEvent::StyledTextOutput(_)
        )
    }
}
