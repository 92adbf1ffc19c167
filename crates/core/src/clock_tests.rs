// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[test]
fn fake_clock_starts_at_a_fixed_instant_and_holds_it() {
    let clock = FakeClock::new();
    let t0 = clock.now();
    let t1 = clock.now();
    assert_eq!(t0, t1);
}

#[test]
fn advance_moves_time_forward_monotonically() {
    let clock = FakeClock::new();
    let before = clock.now();
    clock.advance(Duration::from_millis(500));
    let after = clock.now();
    assert!(after > before);
    assert_eq!(after - before, Duration::from_millis(500));
}

#[test]
fn set_pins_the_clock_to_an_explicit_instant() {
    let clock = FakeClock::new();
    let target = Instant::now() + Duration::from_secs(10);
    clock.set(target);
    assert_eq!(clock.now(), target);
}

#[test]
fn system_clock_never_goes_backwards_across_two_reads() {
    let clock = SystemClock;
    let a = clock.now();
    let b = clock.now();
    assert!(b >= a);
}
