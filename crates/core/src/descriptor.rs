// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Immutable operation metadata.

use std::sync::Arc;

use crate::id::OperationId;
use crate::state::OperationState;

/// Category of a build operation. `Task` and `ConfigureProject` are the two
/// variants the grouping output pipeline treats as grouping operations;
/// every other variant passes its output straight through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BuildOperationType {
    Task,
    ConfigureProject,
    DependencyResolution,
    ArtifactDownload,
    Uncategorized,
}

impl BuildOperationType {
    /// Whether operations of this type trigger buffering of descendant
    /// output until completion.
    pub fn is_grouping(self) -> bool {
        matches!(self, Self::Task | Self::ConfigureProject)
    }
}

/// Immutable metadata for one build operation, built once via
/// [`BuildOperationDescriptorBuilder`] and never mutated afterward.
#[derive(Debug, Clone)]
pub struct BuildOperationDescriptor {
    pub id: OperationId,
    pub parent_id: Option<OperationId>,
    pub display_name: String,
    pub progress_display_name: Option<String>,
    pub operation_type: BuildOperationType,
}

impl BuildOperationDescriptor {
    pub fn builder(display_name: impl Into<String>) -> BuildOperationDescriptorBuilder {
        BuildOperationDescriptorBuilder::new(display_name)
    }
}

/// Builds a [`BuildOperationDescriptor`].
///
/// `parent_id` is left unset by most callers — the executor resolves it from
/// the calling thread's current operation at build time. Callers that need
/// to name an explicit parent (e.g. a queue worker running under a captured
/// default parent) can override it with [`Self::parent`].
#[derive(Clone, Default)]
pub struct BuildOperationDescriptorBuilder {
    parent: Option<Arc<OperationState>>,
    display_name: String,
    progress_display_name: Option<String>,
    operation_type: Option<BuildOperationType>,
}

impl std::fmt::Debug for BuildOperationDescriptorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildOperationDescriptorBuilder")
            .field("parent", &self.parent.as_ref().map(|p| p.descriptor.id))
            .field("display_name", &self.display_name)
            .field("progress_display_name", &self.progress_display_name)
            .field("operation_type", &self.operation_type)
            .finish()
    }
}

impl BuildOperationDescriptorBuilder {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            parent: None,
            display_name: display_name.into(),
            progress_display_name: None,
            operation_type: None,
        }
    }

    pub fn parent(mut self, parent: Arc<OperationState>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn progress_display_name(mut self, name: impl Into<String>) -> Self {
        self.progress_display_name = Some(name.into());
        self
    }

    pub fn operation_type(mut self, operation_type: BuildOperationType) -> Self {
        self.operation_type = Some(operation_type);
        self
    }

    /// Explicit parent set on the builder, if any. The executor falls back
    /// to the default parent (or fabricates an unmanaged one) when `None`.
    pub fn explicit_parent(&self) -> Option<Arc<OperationState>> {
        self.parent.clone()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Finish building, given the `id` minted by the executor and the
    /// parent state resolved per the envelope in `spec.md` §4.1 step 1.
    pub fn build(self, id: OperationId, parent: Option<&Arc<OperationState>>) -> BuildOperationDescriptor {
        BuildOperationDescriptor {
            id,
            parent_id: parent.map(|p| p.descriptor.id),
            display_name: self.display_name,
            progress_display_name: self.progress_display_name,
            operation_type: self.operation_type.unwrap_or(BuildOperationType::Uncategorized),
        }
    }
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
