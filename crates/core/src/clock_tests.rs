use super::*;

#[test]
fn fake_clock_advances() {
    let clock = FakeClock::new(1_000);
    assert_eq!(clock.now_ms(), 1_000);
    clock.advance_ms(500);
    assert_eq!(clock.now_ms(), 1_500);
}

#[test]
fn fake_clock_set_is_absolute() {
    let clock = FakeClock::new(1_000);
    clock.set(42);
    assert_eq!(clock.now_ms(), 42);
}

#[test]
fn system_clock_now_ms_is_positive() {
    let clock = SystemClock;
    assert!(clock.now_ms() > 0);
}

#[test]
fn now_utc_round_trips_through_now_ms() {
    let dt = Utc::now();
    let clock = FakeClock::from_utc(dt);
    assert_eq!(clock.now_utc().timestamp_millis(), dt.timestamp_millis());
}
