//! Benchmarks for the automation engine's block step.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use valvetrain_dsp::automation::AutomationEngine;

use crate::BLOCK_SIZES;

pub fn bench_automation(c: &mut Criterion) {
    let mut group = c.benchmark_group("automation");

    for &size in BLOCK_SIZES {
        // A realistic amp model: a few dozen controls, a couple in flight.
        let mut engine = AutomationEngine::new(48_000.0);
        let controls: Vec<_> = (0..32)
            .map(|i| engine.register(format!("control_{i}"), 0.5))
            .collect();
        engine.schedule(controls[0], 1.0, 30.0);
        engine.schedule(controls[1], 0.0, 30.0);
        engine.crossfade(controls[2], controls[3], 30.0);

        group.bench_with_input(BenchmarkId::new("process_block", size), &size, |b, _| {
            b.iter(|| engine.process_block(black_box(size)))
        });
    }

    group.finish();
}
