//! Low-level DSP primitives shared by every amplifier model.
//!
//! These components are allocation-free and realtime-safe: once constructed,
//! their block-processing paths never allocate, lock, or panic, making them
//! safe to call from the audio thread. Anything slow (transfer-curve
//! synthesis, model validation) happens ahead of time in [`crate::model`].

/// Nonlinear transfer-curve synthesis for saturation stages.
pub mod curve;
/// Hybrid peak/RMS envelope follower shared by the dynamics processors.
pub mod envelope;
/// Hysteretic noise gate with hold time.
pub mod gate;
/// Decibel <-> linear amplitude conversions.
pub mod level;
/// Crossfade and dry/wet blending primitives.
pub mod mix;
/// Power-supply sag (voltage droop) simulator.
pub mod sag;

pub use envelope::{EnvelopeDetector, EnvelopeState};
