use crate::dsp::envelope::EnvelopeDetector;
use crate::error::{check_peak_mix, check_positive_time, ConfigError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Power-Supply Sag
================

Hit a tube amp hard and the rectifier cannot keep the supply rail up: the
available headroom drops, the sound compresses, and when the chord dies
away the rail climbs back — quickly at first, then easing into place. That
recovery is the "bloom" players describe, and it is the whole point of this
processor.

Unlike the gate this is not a state machine; it is a continuous gain
reducer driven by the envelope:

    target = clamp(1 - depth * env^shape, floor, 1)

  depth    How much headroom a full-scale signal removes. Silicon
           rectifiers ~0.08, tube rectifiers ~0.15.

  shape    Exponent on the envelope. 1.0 = linear (silicon-like);
           values above 1 concentrate the droop at high playing
           intensity, like a real tube rectifier.

  floor    Absolute minimum headroom in (0, 1). A real supply never
           collapses to zero, so neither does the gain.

Attack (gain falling) uses a single time constant. Recovery is two-stage:
the release time constant interpolates from `fast_release_seconds` while
the supply is deeply sagged to `slow_release_seconds` as the gain nears
unity. A step down in input therefore recovers a large fraction of the
remaining distance in the first fast-release window and progressively
less in each window after it — quick partial bounce-back, long musical
tail.

The simulator is a strict function of its config and input: the same
signal always produces the same gain trajectory.
*/

/// Construction parameters for [`SagSimulator`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SagConfig {
    /// Headroom removed at full-scale envelope, in (0, 1).
    pub depth: f32,
    /// Time constant while the gain is dropping.
    pub attack_seconds: f32,
    /// Release time constant while deeply sagged.
    pub fast_release_seconds: f32,
    /// Release time constant as the gain approaches unity.
    pub slow_release_seconds: f32,
    /// RMS window of the internal envelope detector.
    pub envelope_window_seconds: f32,
    /// Envelope exponent, >= 1. 1 = linear, higher = progressive.
    pub response_shape: f32,
    /// Minimum gain in (0, 1); the supply never fully collapses.
    pub floor_gain: f32,
    /// Peak/RMS blend of the detector, in [0, 1].
    pub peak_mix: f32,
}

impl Default for SagConfig {
    /// Tube-rectifier voicing; silicon models drop depth to ~0.08 and
    /// shape to 1.0.
    fn default() -> Self {
        Self {
            depth: 0.15,
            attack_seconds: 0.006,
            fast_release_seconds: 0.06,
            slow_release_seconds: 0.2,
            envelope_window_seconds: 0.025,
            response_shape: 1.6,
            floor_gain: 0.25,
            peak_mix: 0.3,
        }
    }
}

impl SagConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.depth > 0.0 && self.depth < 1.0) {
            return Err(ConfigError::SagDepth(self.depth));
        }
        if !(self.floor_gain > 0.0 && self.floor_gain < 1.0) {
            return Err(ConfigError::FloorGain {
                name: "sag",
                value: self.floor_gain,
            });
        }
        if !(self.response_shape >= 1.0 && self.response_shape.is_finite()) {
            return Err(ConfigError::SagShape(self.response_shape));
        }
        check_positive_time("sag attack", self.attack_seconds)?;
        check_positive_time("sag fast release", self.fast_release_seconds)?;
        check_positive_time("sag slow release", self.slow_release_seconds)?;
        check_positive_time("sag envelope window", self.envelope_window_seconds)?;
        check_peak_mix(self.peak_mix)?;
        Ok(())
    }
}

/// Continuous supply-voltage droop simulator.
///
/// Produces one multiplicative gain per block, always within
/// `[floor_gain, 1.0]`. Realtime-safe after construction.
pub struct SagSimulator {
    depth: f32,
    shape: f32,
    floor: f32,
    attack_seconds: f32,
    fast_release_seconds: f32,
    slow_release_seconds: f32,
    sample_rate: f32,

    detector: EnvelopeDetector,
    gain: f32,
}

impl SagSimulator {
    pub fn new(config: SagConfig, sample_rate: f32) -> Result<Self, ConfigError> {
        config.validate()?;
        check_positive_time("sag sample rate", sample_rate)?;
        Ok(Self {
            depth: config.depth,
            shape: config.response_shape,
            floor: config.floor_gain,
            attack_seconds: config.attack_seconds,
            fast_release_seconds: config.fast_release_seconds,
            slow_release_seconds: config.slow_release_seconds,
            sample_rate,
            detector: EnvelopeDetector::new(
                config.envelope_window_seconds,
                config.peak_mix,
                sample_rate,
            ),
            gain: 1.0,
        })
    }

    /// Advance one block and return the supply gain.
    pub fn process_block(&mut self, samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return self.gain;
        }

        let env = self.detector.process_block(samples).blended;
        let shaped = env.max(0.0).powf(self.shape);
        let target = (1.0 - self.depth * shaped).clamp(self.floor, 1.0);

        let dt = samples.len() as f32 / self.sample_rate;
        let tau = if target < self.gain {
            self.attack_seconds
        } else {
            // Two-stage release: fast while deeply sagged, sliding toward
            // the slow constant as the gain nears unity.
            let sagged = ((1.0 - self.gain) / self.depth).clamp(0.0, 1.0);
            self.slow_release_seconds
                + (self.fast_release_seconds - self.slow_release_seconds) * sagged
        };

        let alpha = (-dt / tau).exp();
        self.gain = target + (self.gain - target) * alpha;
        self.gain = self.gain.clamp(self.floor, 1.0);
        self.gain
    }

    /// Current gain without advancing.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Return to the rested, full-headroom state.
    pub fn reset(&mut self) {
        self.detector.reset();
        self.gain = 1.0;
    }
}
