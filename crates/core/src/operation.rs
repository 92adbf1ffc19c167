// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traits implemented by the build operation bodies the executor runs.
//!
//! These bodies are the one external collaborator the executor is built
//! around (`spec.md` §1, Out of scope) — only the traits live here; concrete
//! operations belong to callers.

use crate::context::BuildOperationContext;
use crate::descriptor::BuildOperationDescriptorBuilder;
use crate::error::BuildOperationFailure;

/// A build operation that produces no result.
pub trait RunnableBuildOperation: Send {
    fn description(&self) -> BuildOperationDescriptorBuilder;
    fn run(&self, ctx: &BuildOperationContext<()>) -> Result<(), BuildOperationFailure>;
}

/// A build operation that produces a value of type `T`.
pub trait CallableBuildOperation<T>: Send {
    fn description(&self) -> BuildOperationDescriptorBuilder;
    fn call(&self, ctx: &BuildOperationContext<T>) -> Result<T, BuildOperationFailure>;
}

/// A pluggable strategy for executing an operation, allowing user-supplied
/// adapters (`spec.md` §6, Build Operation API).
pub trait BuildOperationWorker<Op, T>: Send + Sync {
    fn execute(&self, op: &Op, ctx: &BuildOperationContext<T>) -> Result<T, BuildOperationFailure>;
}

/// Adapts any closure into a [`RunnableBuildOperation`] — the common case in
/// tests and small call sites where a full struct would be overkill.
pub struct RunnableFn<F> {
    display_name: String,
    body: F,
}

impl<F> RunnableFn<F>
where
    F: Fn(&BuildOperationContext<()>) -> Result<(), BuildOperationFailure> + Send,
{
    pub fn new(display_name: impl Into<String>, body: F) -> Self {
        Self {
            display_name: display_name.into(),
            body,
        }
    }
}

impl<F> RunnableBuildOperation for RunnableFn<F>
where
    F: Fn(&BuildOperationContext<()>) -> Result<(), BuildOperationFailure> + Send,
{
    fn description(&self) -> BuildOperationDescriptorBuilder {
        BuildOperationDescriptorBuilder::new(self.display_name.clone())
    }

    fn run(&self, ctx: &BuildOperationContext<()>) -> Result<(), BuildOperationFailure> {
        (self.body)(ctx)
    }
}

/// Adapts any closure into a [`CallableBuildOperation`].
pub struct CallableFn<F> {
    display_name: String,
    body: F,
}

impl<F, T> CallableFn<F>
where
    F: Fn(&BuildOperationContext<T>) -> Result<T, BuildOperationFailure> + Send,
{
    pub fn new(display_name: impl Into<String>, body: F) -> Self {
        Self {
            display_name: display_name.into(),
            body,
        }
    }
}

impl<F, T> CallableBuildOperation<T> for CallableFn<F>
where
    F: Fn(&BuildOperationContext<T>) -> Result<T, BuildOperationFailure> + Send,
{
    fn description(&self) -> BuildOperationDescriptorBuilder {
        BuildOperationDescriptorBuilder::new(self.display_name.clone())
    }

    fn call(&self, ctx: &BuildOperationContext<T>) -> Result<T, BuildOperationFailure> {
        (self.body)(ctx)
    }
}
