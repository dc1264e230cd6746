//! Benchmarks for the dynamics and waveshaping core.
//!
//! Run with: cargo bench
//!
//! Everything under dsp/* except curve synthesis runs on the realtime
//! callback and must complete well inside one block's deadline.
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Curve synthesis is the deliberate exception: it runs at model build
//! time and is benchmarked to keep preset switching snappy, not to meet
//! an audio deadline.

use criterion::{criterion_group, criterion_main};

mod dsp;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    dsp::bench_curve,
    dsp::bench_envelope,
    dsp::bench_gate,
    dsp::bench_sag,
    dsp::bench_automation,
);
criterion_main!(benches);
