//! Benchmarks for the hybrid peak/RMS envelope detector.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use valvetrain_dsp::dsp::envelope::EnvelopeDetector;

use crate::{dsp::tone_block, BLOCK_SIZES};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let block = tone_block(size, 0.5);
        let mut det = EnvelopeDetector::new(0.015, 0.3, 48_000.0);

        group.bench_with_input(BenchmarkId::new("process_block", size), &size, |b, _| {
            b.iter(|| det.process_block(black_box(&block)))
        });
    }

    group.finish();
}
