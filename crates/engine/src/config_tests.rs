// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_floors_zero_at_one() {
    let config = ExecutorConfig::new(0);
    assert_eq!(config.max_workers, 1);
}

#[test]
fn default_is_at_least_one() {
    let config = ExecutorConfig::default();
    assert!(config.max_workers >= 1);
}
