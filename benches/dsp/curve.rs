//! Benchmarks for transfer-curve synthesis (build-time path).

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use valvetrain_dsp::dsp::curve::{build_curve, CurveParams, Harmonic};

pub fn bench_curve(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/curve");

    let plain = CurveParams {
        drive: 6.0,
        ..CurveParams::default()
    };
    let rich = CurveParams {
        drive: 6.0,
        asymmetry_offset: 0.08,
        harmonics: vec![
            Harmonic { order: 2, weight: 0.15 },
            Harmonic { order: 3, weight: 0.25 },
            Harmonic { order: 5, weight: 0.05 },
        ],
        knee_threshold: 0.7,
        knee_ratio: 0.4,
    };

    for resolution in [2048usize, 8192] {
        group.bench_with_input(
            BenchmarkId::new("plain", resolution),
            &resolution,
            |b, &res| b.iter(|| build_curve(black_box(&plain), black_box(res)).unwrap()),
        );
        group.bench_with_input(
            BenchmarkId::new("three_harmonics", resolution),
            &resolution,
            |b, &res| b.iter(|| build_curve(black_box(&rich), black_box(res)).unwrap()),
        );
    }

    group.finish();
}
