// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::descriptor::BuildOperationDescriptor;
use crate::id::OperationId;

fn descriptor() -> BuildOperationDescriptor {
    BuildOperationDescriptor::builder("Execute :foo").build(OperationId(1), None)
}

#[test]
fn new_state_starts_not_running() {
    let state = OperationState::new(descriptor(), Instant::now());
    assert!(!state.is_running());
    assert!(!state.is_unmanaged());
}

#[test]
fn mark_running_then_finished_round_trips() {
    let state = OperationState::new(descriptor(), Instant::now());
    state.mark_running();
    assert!(state.is_running());
    state.mark_finished();
    assert!(!state.is_running());
}

#[test]
fn unmanaged_constructor_tags_the_state() {
    let state = OperationState::unmanaged(descriptor(), Instant::now());
    assert!(state.is_unmanaged());
    assert!(!state.is_running());
}
