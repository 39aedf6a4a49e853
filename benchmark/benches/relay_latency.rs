// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Input relay microbenchmarks.
//!
//! Measures guarded writes from the front-end side and drains from the
//! consumer side, uncontended.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use inputrelay_benchmark::BenchRegion;
use inputrelay_core::WaitPolicy;

/// Benchmark the bounded-wait mouse path.
fn bench_send_mouse_pos(c: &mut Criterion) {
    let region = BenchRegion::new("mouse").expect("Failed to name region");
    let frontend = region.open().expect("Failed to open relay");
    let consumer = region.open().expect("Failed to open relay");

    let mut group = c.benchmark_group("frontend");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("send_mouse_pos", |b| {
        b.iter(|| frontend.send_mouse_pos(black_box(1), black_box(-1)));
    });

    group.bench_function("set_key_state", |b| {
        let mut down = false;
        b.iter(|| {
            down = !down;
            frontend.set_key_state(black_box(0x41), down)
        });
    });

    group.bench_function("batched_under_one_guard", |b| {
        b.iter(|| {
            let mut guard = frontend.must_acquire().expect("guard");
            guard.accumulate_mouse_delta(black_box(2), black_box(3));
            guard.set_mouse_wheel(black_box(120));
        });
    });

    group.finish();

    // Keep the accumulator from saturating between runs
    consumer.drain(WaitPolicy::Infinite);
}

/// Benchmark the consumer-side drain.
fn bench_drain(c: &mut Criterion) {
    let region = BenchRegion::new("drain").expect("Failed to name region");
    let frontend = region.open().expect("Failed to open relay");
    let consumer = region.open().expect("Failed to open relay");

    let mut group = c.benchmark_group("consumer");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("write_then_drain", |b| {
        b.iter(|| {
            frontend.send_mouse_pos(3, -2);
            black_box(consumer.drain(WaitPolicy::INPUT_EVENT))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_send_mouse_pos, bench_drain);
criterion_main!(benches);
