//! Benchmarks for the power-supply sag simulator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use valvetrain_dsp::dsp::sag::{SagConfig, SagSimulator};

use crate::{dsp::tone_block, BLOCK_SIZES};

pub fn bench_sag(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/sag");

    for &size in BLOCK_SIZES {
        let block = tone_block(size, 0.9);
        let mut sag = SagSimulator::new(SagConfig::default(), 48_000.0).unwrap();

        group.bench_with_input(BenchmarkId::new("process_block", size), &size, |b, _| {
            b.iter(|| sag.process_block(black_box(&block)))
        });
    }

    group.finish();
}
