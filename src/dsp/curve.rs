use crate::error::ConfigError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Transfer-Curve Synthesis
========================

Every saturation stage in an amplifier model applies a fixed nonlinear
mapping from input amplitude to output amplitude. This module builds those
mappings as lookup tables, ahead of time, so the realtime path only ever
indexes into a finished read-only table.

Vocabulary
----------

  transfer curve   A table of N output samples indexed by normalized input
                   amplitude in [-1, 1]. Index 0 maps input -1, the midpoint
                   maps input 0, the last index maps input +1.

  drive            How hard the input is pushed into the nonlinear region of
                   tanh. Low drive stays near-linear; high drive saturates.

  harmonic         An extra tanh term evaluated at a multiple of the input,
                   weight * tanh(x * order * drive). Odd orders model the
                   symmetric clipping of push-pull stages, even orders the
                   asymmetric character of single-ended tube stages.

  asymmetry        Shifting the operating point of the base nonlinearity,
                   like a tube biased off-center. We evaluate at (x + offset)
                   and subtract the value at the offset alone so zero input
                   still maps to zero output (no DC thump when the signal
                   stops).

  soft knee        Above a threshold, excess output is compressed by a ratio
                   instead of clipped. The curve approaches +/-1 without the
                   hard corner that produces harsh aliasing.


The Pipeline (per table index)
------------------------------

    x = 2*i/N - 1                                        normalized input
    y = tanh((x + offset) * drive) - tanh(offset * drive)  biased base
    y += sum( weight * tanh(x * order * drive) )           harmonic content
    if |y| > knee_threshold:                               soft knee
        y = sign(y) * (threshold + (|y| - threshold) * ratio)

After the loop the whole table is scaled so its maximum magnitude lands at
HEADROOM (just under 1.0). That keeps downstream stages out of hard
clipping, and it is what makes near-zero drive come out near-linear: a tiny
tanh slice is almost a straight line, and normalization stretches it back
to full scale.

Determinism
-----------

Curve building uses no randomness and no time-dependent state: equal params
and resolution always produce a bit-identical table. The curve cache in
[`crate::model::cache`] relies on this, which is why [`CurveParams`]
implements Eq/Hash over exact f32 bit patterns rather than tolerant
comparison.
*/

/// Tables coarser than this cause audible stair-stepping and are rejected.
pub const MIN_RESOLUTION: usize = 512;

/// Resolution used by the stock amplifier models.
pub const DEFAULT_RESOLUTION: usize = 2048;

/// Normalization target; the loudest table entry lands here, strictly below
/// full scale so downstream stages have headroom.
const HEADROOM: f32 = 0.995;

/// One harmonic term of a saturation curve.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct Harmonic {
    /// Multiple of the fundamental (2 = octave, 3 = twelfth, ...).
    pub order: u32,
    /// Contribution of this term; negative weights subtract.
    pub weight: f32,
}

/// Full parameter set for one transfer curve.
///
/// Two equal `CurveParams` always synthesize bit-identical tables.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct CurveParams {
    /// Input gain into the base nonlinearity. Must be positive.
    pub drive: f32,
    /// Operating-point shift in [-0.2, 0.2]; 0 is symmetric.
    pub asymmetry_offset: f32,
    /// Additional harmonic terms, usually zero to three entries.
    pub harmonics: Vec<Harmonic>,
    /// Output level in (0, 1] where soft-knee compression begins.
    pub knee_threshold: f32,
    /// Compression applied to output above the knee, in (0, 1].
    pub knee_ratio: f32,
}

impl Default for CurveParams {
    fn default() -> Self {
        Self {
            drive: 1.0,
            asymmetry_offset: 0.0,
            harmonics: Vec::new(),
            knee_threshold: 0.8,
            knee_ratio: 0.5,
        }
    }
}

impl CurveParams {
    /// Check every field against its documented range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.drive > 0.0 && self.drive.is_finite()) {
            return Err(ConfigError::CurveDrive(self.drive));
        }
        if !(-0.2..=0.2).contains(&self.asymmetry_offset) {
            return Err(ConfigError::CurveAsymmetry(self.asymmetry_offset));
        }
        let knee_ok = |v: f32| v > 0.0 && v <= 1.0;
        if !knee_ok(self.knee_threshold) || !knee_ok(self.knee_ratio) {
            return Err(ConfigError::CurveKnee {
                threshold: self.knee_threshold,
                ratio: self.knee_ratio,
            });
        }
        Ok(())
    }
}

// Equality and hashing over exact bit patterns: the cache key must treat
// -0.0 and 0.0, or two NaN payloads, as distinct only if the synthesized
// tables could differ, and bitwise identity is the conservative answer that
// also upholds the determinism contract.
impl PartialEq for CurveParams {
    fn eq(&self, other: &Self) -> bool {
        self.drive.to_bits() == other.drive.to_bits()
            && self.asymmetry_offset.to_bits() == other.asymmetry_offset.to_bits()
            && self.knee_threshold.to_bits() == other.knee_threshold.to_bits()
            && self.knee_ratio.to_bits() == other.knee_ratio.to_bits()
            && self.harmonics.len() == other.harmonics.len()
            && self
                .harmonics
                .iter()
                .zip(other.harmonics.iter())
                .all(|(a, b)| a.order == b.order && a.weight.to_bits() == b.weight.to_bits())
    }
}

impl Eq for CurveParams {}

impl std::hash::Hash for CurveParams {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.drive.to_bits().hash(state);
        self.asymmetry_offset.to_bits().hash(state);
        self.knee_threshold.to_bits().hash(state);
        self.knee_ratio.to_bits().hash(state);
        for h in &self.harmonics {
            h.order.hash(state);
            h.weight.to_bits().hash(state);
        }
    }
}

/// An immutable synthesized transfer curve.
///
/// Built off the realtime path and handed to the host's waveshaping stage
/// as a finished, read-only table. Shared across stages via
/// `Arc<TransferCurve>` when params match (see [`crate::model::cache`]).
#[derive(Debug, Clone, PartialEq)]
pub struct TransferCurve {
    samples: Box<[f32]>,
}

impl TransferCurve {
    /// The raw table, index 0 = input -1.0, last index = input +1.0.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Look up an arbitrary input in [-1, 1] with linear interpolation.
    ///
    /// Hosts with their own table-lookup stage will index `samples()`
    /// directly; this is for hosts without one, and for tests.
    pub fn evaluate(&self, input: f32) -> f32 {
        let x = input.clamp(-1.0, 1.0);
        // Inverse of the build-time index mapping x = 2*i/N - 1, so input
        // 0.0 lands exactly on the zero midpoint sample.
        let pos = (x + 1.0) * 0.5 * self.samples.len() as f32;
        let idx = pos as usize;
        if idx + 1 >= self.samples.len() {
            return self.samples[self.samples.len() - 1];
        }
        let frac = pos - idx as f32;
        self.samples[idx] * (1.0 - frac) + self.samples[idx + 1] * frac
    }
}

/// Synthesize a transfer curve from `params` at the given table resolution.
///
/// Slow path: allocates and runs `resolution` tanh evaluations. Call it at
/// model build time, never from the audio callback.
pub fn build_curve(params: &CurveParams, resolution: usize) -> Result<TransferCurve, ConfigError> {
    params.validate()?;
    if resolution < MIN_RESOLUTION {
        return Err(ConfigError::CurveResolution(resolution));
    }

    let mut samples = vec![0.0f32; resolution].into_boxed_slice();

    // Subtracting the base nonlinearity's value at the offset alone keeps
    // zero input mapped exactly to zero output.
    let bias = (params.asymmetry_offset * params.drive).tanh();

    for (i, slot) in samples.iter_mut().enumerate() {
        let x = (2.0 * i as f32) / resolution as f32 - 1.0;

        let mut y = ((x + params.asymmetry_offset) * params.drive).tanh() - bias;
        for h in &params.harmonics {
            y += h.weight * (x * h.order as f32 * params.drive).tanh();
        }

        if y.abs() > params.knee_threshold {
            let excess = y.abs() - params.knee_threshold;
            y = y.signum() * (params.knee_threshold + excess * params.knee_ratio);
        }

        *slot = y;
    }

    let max = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    if max > 0.0 {
        let scale = HEADROOM / max;
        for s in samples.iter_mut() {
            *s *= scale;
        }
    }

    Ok(TransferCurve { samples })
}
