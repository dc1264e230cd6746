//! Benchmarks for the hysteretic gate.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use valvetrain_dsp::dsp::gate::{GateConfig, HystereticGate};

use crate::{dsp::tone_block, BLOCK_SIZES};

pub fn bench_gate(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/gate");

    for &size in BLOCK_SIZES {
        let loud = tone_block(size, 0.5);
        let quiet = tone_block(size, 0.0005);

        // Held open by a strong signal.
        let mut gate = HystereticGate::new(GateConfig::default(), 48_000.0).unwrap();
        group.bench_with_input(BenchmarkId::new("open", size), &size, |b, _| {
            b.iter(|| gate.process_block(black_box(&loud)))
        });

        // Hovering near the thresholds, the worst case for the state logic.
        let mut gate = HystereticGate::new(GateConfig::default(), 48_000.0).unwrap();
        group.bench_with_input(BenchmarkId::new("near_threshold", size), &size, |b, _| {
            b.iter(|| gate.process_block(black_box(&quiet)))
        });
    }

    group.finish();
}
