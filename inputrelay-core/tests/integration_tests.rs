// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! End-to-end tests for the input relay.
//!
//! Two handles opened on the same region name stand in for the front-end
//! and consumer processes; extra threads provide contention.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use inputrelay_core::{
    ConfigLoader, FpsLimit, InputRelay, LockError, RegionName, RelayConfig, SharedRegion,
    WaitPolicy,
};
use tempfile::NamedTempFile;

static NEXT_REGION: AtomicUsize = AtomicUsize::new(0);

/// A uniquely named region, removed when the test ends.
struct TestRegion {
    config: RelayConfig,
}

impl TestRegion {
    fn new(tag: &str) -> Self {
        let name = format!(
            "inputrelay-it-{}-{}-{}",
            tag,
            std::process::id(),
            NEXT_REGION.fetch_add(1, Ordering::Relaxed)
        );
        let config = RelayConfig {
            region_name: RegionName::new(name).expect("valid region name"),
            ..RelayConfig::default()
        };
        Self { config }
    }

    fn open(&self) -> InputRelay {
        InputRelay::open(&self.config).expect("Failed to open relay")
    }
}

impl Drop for TestRegion {
    fn drop(&mut self) {
        let _ = SharedRegion::unlink(self.config.region_name.as_str());
    }
}

#[test]
fn test_fps_limit_visible_to_second_process() {
    let region = TestRegion::new("fps");
    let frontend = region.open();
    let consumer = region.open();
    assert!(frontend.created());
    assert!(!consumer.created());

    frontend.set_fps_limit(Some(60.0));

    let guard = consumer.must_acquire().unwrap();
    assert_eq!(guard.fps_limit(), FpsLimit::from(60));
}

#[test]
fn test_mouse_deltas_accumulate_until_drained() {
    let region = TestRegion::new("mouse");
    let frontend = region.open();
    let consumer = region.open();

    assert!(frontend.send_mouse_pos(3, -2));
    assert!(frontend.send_mouse_pos(1, 1));

    let drained = consumer.drain(WaitPolicy::Infinite).unwrap();
    assert_eq!((drained.mouse_dx, drained.mouse_dy), (4, -1));

    let again = consumer.drain(WaitPolicy::Infinite).unwrap();
    assert_eq!((again.mouse_dx, again.mouse_dy), (0, 0));
}

#[test]
fn test_concurrent_senders_sum_applied_deltas() {
    let region = TestRegion::new("concurrent");
    let consumer = region.open();
    let applied = AtomicUsize::new(0);

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let frontend = region.open();
                for _ in 0..200 {
                    if frontend.send_mouse_pos(1, -2) {
                        applied.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    let applied = applied.load(Ordering::Relaxed) as i32;
    let drained = consumer.drain(WaitPolicy::Infinite).unwrap();
    assert_eq!((drained.mouse_dx, drained.mouse_dy), (applied, -2 * applied));
}

#[test]
fn test_contended_guard_drops_bounded_events() {
    let region = TestRegion::new("contended");
    let holder = region.open();
    let frontend = region.open();

    let guard = holder.must_acquire().unwrap();
    let before = *guard;

    std::thread::scope(|s| {
        s.spawn(|| {
            for ms in [0, 1, 5, 10] {
                assert!(frontend.try_acquire(Duration::from_millis(ms)).is_none());
            }
            assert!(!frontend.send_mouse_pos(5, 5));
            assert!(!frontend.send_mouse_wheel(120));
        });
    });

    // Nothing was written while the guard was held elsewhere
    assert_eq!(*guard, before);
    drop(guard);

    assert!(frontend.send_mouse_pos(5, 5));
}

#[test]
fn test_must_acquire_waits_for_release() {
    let region = TestRegion::new("must");
    let holder = region.open();
    let frontend = region.open();

    std::thread::scope(|s| {
        let guard = holder.must_acquire().unwrap();
        let start = Instant::now();

        let waiter = s.spawn(|| {
            // Blocks until the holder releases, then applies
            frontend.set_key_state(0x41, true)
        });

        std::thread::sleep(Duration::from_millis(50));
        assert!(!waiter.is_finished());
        drop(guard);

        assert!(waiter.join().unwrap());
        assert!(start.elapsed() >= Duration::from_millis(50));
    });

    let snapshot = holder.snapshot(WaitPolicy::Infinite).unwrap();
    assert_eq!(snapshot.pressed_keys, vec![0x41]);
}

#[test]
fn test_unbounded_try_acquire_waits_for_release() {
    let region = TestRegion::new("huge-wait");
    let holder = region.open();
    let frontend = region.open();

    std::thread::scope(|s| {
        let guard = holder.must_acquire().unwrap();

        let waiter = s.spawn(|| {
            let mut guard = frontend.try_acquire(Duration::MAX)?;
            guard.accumulate_mouse_delta(7, -7);
            Some(())
        });

        std::thread::sleep(Duration::from_millis(20));
        assert!(!waiter.is_finished());
        drop(guard);

        assert!(waiter.join().unwrap().is_some());
    });

    let drained = holder.drain(WaitPolicy::Infinite).unwrap();
    assert_eq!((drained.mouse_dx, drained.mouse_dy), (7, -7));
}

#[test]
fn test_every_operation_releases_the_guard() {
    let region = TestRegion::new("pairing");
    let frontend = region.open();
    let observer = region.open();

    let released = |what: &str| {
        std::thread::scope(|s| {
            s.spawn(|| {
                let guard = observer.acquire(WaitPolicy::Bounded(Duration::ZERO));
                assert!(guard.is_ok(), "guard still held after {}", what);
            });
        });
    };

    assert!(frontend.send_mouse_pos(1, 1));
    released("send_mouse_pos");
    assert!(frontend.send_mouse_wheel(-120));
    released("send_mouse_wheel");
    // Button toggles once returned early without releasing; must not any more
    assert!(frontend.set_mouse_button_state(0, true));
    released("set_mouse_button_state(down)");
    assert!(frontend.set_mouse_button_state(0, false));
    released("set_mouse_button_state(up)");
    assert!(frontend.set_key_state(0x20, true));
    released("set_key_state");
    frontend.set_fps_limit(Some(144.0));
    released("set_fps_limit");
    frontend.set_input_char("x");
    released("set_input_char");
    frontend.set_input_char("");
    released("set_input_char(empty)");
    assert!(!frontend.set_key_state(999, true));
    released("set_key_state(out of range)");
    assert!(!frontend.set_mouse_button_state(40, true));
    released("set_mouse_button_state(out of range)");
    assert!(observer.drain(WaitPolicy::INPUT_EVENT).is_some());
    released("drain");
}

#[cfg(target_os = "linux")]
#[test]
fn test_abandoned_guard_is_recovered() {
    let region = TestRegion::new("abandoned");
    let frontend = region.open();
    let consumer = region.open();

    // A holder that never releases, as a leaked acquire would
    std::thread::scope(|s| {
        s.spawn(|| {
            let mut guard = frontend.must_acquire().unwrap();
            guard.accumulate_mouse_delta(2, 2);
            std::mem::forget(guard);
        });
    });

    let guard = consumer.must_acquire().unwrap();
    assert!(guard.recovered());
    assert_eq!(guard.mouse_delta(), (2, 2));
    drop(guard);

    // Back to normal operation afterwards
    assert!(frontend.send_mouse_pos(1, 1));
    let guard = consumer.must_acquire().unwrap();
    assert!(!guard.recovered());
    assert_eq!(guard.mouse_delta(), (3, 3));
}

#[test]
fn test_reacquire_on_same_thread_is_rejected() {
    let region = TestRegion::new("reentrant");
    let relay = region.open();

    let _guard = relay.must_acquire().unwrap();
    assert!(matches!(
        relay.acquire(WaitPolicy::Infinite),
        Err(LockError::WouldDeadlock)
    ));
}

#[test]
fn test_batched_mutations_under_one_guard() {
    let region = TestRegion::new("batch");
    let frontend = region.open();
    let consumer = region.open();

    {
        let mut guard = frontend.must_acquire().unwrap();
        guard.set_mouse_wheel(240);
        guard.accumulate_mouse_delta(-3, 8);
        guard.set_input_char("Q");
    }

    let snapshot = consumer.snapshot(WaitPolicy::Infinite).unwrap();
    assert_eq!(snapshot.mouse_wheel, 240);
    assert_eq!((snapshot.mouse_dx, snapshot.mouse_dy), (-3, 8));
    assert_eq!(snapshot.input_char, Some('Q'));
}

#[test]
fn test_buttons_and_keys_round_trip_between_handles() {
    let region = TestRegion::new("state");
    let frontend = region.open();
    let consumer = region.open();

    assert!(frontend.set_mouse_button_state(1, true));
    assert!(frontend.set_mouse_button_state(3, true));
    assert!(frontend.set_mouse_button_state(1, false));
    assert!(frontend.set_key_state(0x57, true));
    assert!(!frontend.set_key_state(-1, true));

    let snapshot = consumer.snapshot(WaitPolicy::Infinite).unwrap();
    assert_eq!(snapshot.mouse_buttons, 0b1000);
    assert_eq!(snapshot.pressed_keys, vec![0x57]);
}

#[test]
fn test_non_integral_fps_limit_means_uncapped() {
    let region = TestRegion::new("fps-normalize");
    let frontend = region.open();

    assert_eq!(frontend.set_fps_limit(Some(60.0)), Some(FpsLimit::from(60)));
    assert_eq!(frontend.set_fps_limit(Some(29.97)), Some(FpsLimit::UNCAPPED));
    assert_eq!(
        frontend.snapshot(WaitPolicy::Infinite).unwrap().fps_limit,
        FpsLimit::UNCAPPED
    );

    frontend.set_fps_limit(Some(30.0));
    assert_eq!(frontend.set_fps_limit(None), Some(FpsLimit::UNCAPPED));
    assert_eq!(
        frontend.snapshot(WaitPolicy::Infinite).unwrap().fps_limit,
        FpsLimit::UNCAPPED
    );
}

#[test]
fn test_relay_from_config_file() {
    let region = TestRegion::new("config");

    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(
        file,
        "relay:\n  region_name: {}\n  try_acquire_timeout_ms: 2\n",
        region.config.region_name
    )
    .unwrap();

    let config = ConfigLoader::load_file(file.path()).unwrap();
    assert_eq!(config.try_acquire_timeout, Duration::from_millis(2));

    let relay = InputRelay::open(&config).unwrap();
    assert_eq!(relay.region_name(), region.config.region_name.as_str());
    assert_eq!(relay.try_timeout(), Duration::from_millis(2));
}

#[test]
fn test_snapshot_serializes_to_json() {
    let region = TestRegion::new("json");
    let relay = region.open();
    relay.set_fps_limit(Some(75.0));
    relay.set_input_char("é");

    let snapshot = relay.snapshot(WaitPolicy::Infinite).unwrap();
    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["fps_limit"], 75);
    assert_eq!(json["input_char"], "é");
    assert_eq!(json["pressed_keys"], serde_json::json!([]));
}
