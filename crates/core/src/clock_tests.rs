// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fake_clock_can_be_advanced() {
    let clock = FakeClock::new();
    let t1 = clock.now();
    clock.advance(Duration::from_secs(60));
    assert_eq!(clock.elapsed_since(t1), Duration::from_secs(60));
}

#[test]
fn fake_clock_is_cloneable_and_shared() {
    let clock1 = FakeClock::new();
    let clock2 = clock1.clone();
    let t1 = clock1.now();
    clock2.advance(Duration::from_secs(30));
    assert_eq!(clock1.elapsed_since(t1), Duration::from_secs(30));
}

#[test]
fn elapsed_since_future_instant_is_zero() {
    let clock = FakeClock::at(SystemTime::UNIX_EPOCH + Duration::from_secs(100));
    let later = SystemTime::UNIX_EPOCH + Duration::from_secs(500);
    assert_eq!(clock.elapsed_since(later), Duration::ZERO);
}

#[test]
fn fake_clock_set_overrides_current_time() {
    let clock = FakeClock::new();
    let epoch = SystemTime::UNIX_EPOCH;
    clock.set(epoch);
    assert_eq!(clock.now(), epoch);
}
