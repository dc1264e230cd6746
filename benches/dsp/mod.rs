mod automation;
mod curve;
mod envelope;
mod gate;
mod sag;

pub use automation::bench_automation;
pub use curve::bench_curve;
pub use envelope::bench_envelope;
pub use gate::bench_gate;
pub use sag::bench_sag;

/// A full-cycle 1 kHz sine block at 48 kHz, the detector workloads' input.
pub fn tone_block(len: usize, amplitude: f32) -> Vec<f32> {
    (0..len)
        .map(|i| amplitude * (i as f32 / len as f32 * std::f32::consts::TAU).sin())
        .collect()
}
