use crate::dsp::envelope::EnvelopeDetector;
use crate::dsp::level::db_to_lin;
use crate::error::{check_peak_mix, check_positive_time, ConfigError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Hysteretic Noise Gate
=====================

High-gain amp models amplify pickup hiss along with the guitar. The gate
mutes the chain when the player stops, without clipping the front of the
next note and without "chattering".

The two defenses against chatter:

  hysteresis   Opening and closing use different thresholds. The gate opens
               above `open_threshold_db` but only closes below
               `close_threshold_db`, which must sit at least 2 dB lower.
               A signal hovering at one level can therefore never toggle
               the state back and forth on its own.

  hold         After opening, and after each moment the envelope touches
               the close threshold, the gate refuses to close for
               `hold_seconds`. Tremolo picking with tiny gaps between notes
               stays open instead of stuttering.

State machine:

             env > open
    ┌────────┐ ───────────────→ ┌──────┐
    │ Closed │                  │ Open │ ←── env ≥ close re-arms hold
    └────────┘ ←─────────────── └──────┘
             env < close AND
             hold expired

Opening is immediate (a transient must never be gated); closing waits for
the hold. The gain itself slews linearly: floor → 1.0 over
`attack_seconds`, 1.0 → floor over `release_seconds`, so the worst-case
time from silence to fully closed is envelope decay + hold + release.

The floor is attenuated-but-not-silent (e.g. -80 dB): cutting to exact
digital zero produces an audible hard edge on the reverb/noise tail.
*/

/// Construction parameters for [`HystereticGate`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateConfig {
    /// Envelope level above which the gate opens.
    pub open_threshold_db: f32,
    /// Envelope level below which the gate may close; must be at least
    /// 2 dB below `open_threshold_db`.
    pub close_threshold_db: f32,
    /// Time for the gain to ramp from floor to unity.
    pub attack_seconds: f32,
    /// Time for the gain to ramp from unity to floor.
    pub release_seconds: f32,
    /// RMS window of the internal envelope detector.
    pub envelope_window_seconds: f32,
    /// Peak/RMS blend of the detector, in [0, 1].
    pub peak_mix: f32,
    /// Closed-gate residual level; negative dB, never full silence.
    pub floor_db: f32,
    /// Minimum time the gate stays open after the envelope last touched
    /// the close threshold.
    pub hold_seconds: f32,
}

impl Default for GateConfig {
    /// The high-gain preset used by most stock amp models.
    fn default() -> Self {
        Self {
            open_threshold_db: -48.0,
            close_threshold_db: -56.0,
            attack_seconds: 0.001,
            release_seconds: 0.08,
            envelope_window_seconds: 0.015,
            peak_mix: 0.3,
            floor_db: -80.0,
            hold_seconds: 0.008,
        }
    }
}

/// Minimum dB gap between open and close thresholds.
pub const MIN_HYSTERESIS_DB: f32 = 2.0;

impl GateConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.close_threshold_db < self.open_threshold_db - MIN_HYSTERESIS_DB)
            || !self.close_threshold_db.is_finite()
            || !self.open_threshold_db.is_finite()
        {
            return Err(ConfigError::GateThresholds {
                open_db: self.open_threshold_db,
                close_db: self.close_threshold_db,
            });
        }
        check_positive_time("gate attack", self.attack_seconds)?;
        check_positive_time("gate release", self.release_seconds)?;
        check_positive_time("gate envelope window", self.envelope_window_seconds)?;
        check_peak_mix(self.peak_mix)?;
        if !(self.floor_db < 0.0 && self.floor_db.is_finite()) {
            return Err(ConfigError::FloorGain {
                name: "gate",
                value: db_to_lin(self.floor_db),
            });
        }
        if !(self.hold_seconds >= 0.0 && self.hold_seconds.is_finite()) {
            return Err(ConfigError::NonPositiveTime {
                name: "gate hold",
                seconds: self.hold_seconds,
            });
        }
        Ok(())
    }
}

/// Envelope-driven noise gate with hysteresis and hold.
///
/// Produces one multiplicative gain per block, always within
/// `[floor, 1.0]`. The block path never allocates or errors; all config
/// problems are rejected in [`HystereticGate::new`].
pub struct HystereticGate {
    open_lin: f32,
    close_lin: f32,
    floor_lin: f32,
    attack_rate: f32,  // gain units per second while opening
    release_rate: f32, // gain units per second while closing
    hold_seconds: f32,
    sample_rate: f32,

    detector: EnvelopeDetector,
    open: bool,
    hold_remaining: f32,
    gain: f32,
}

impl HystereticGate {
    pub fn new(config: GateConfig, sample_rate: f32) -> Result<Self, ConfigError> {
        config.validate()?;
        check_positive_time("gate sample rate", sample_rate)?;

        let floor_lin = db_to_lin(config.floor_db);
        let span = 1.0 - floor_lin;
        Ok(Self {
            open_lin: db_to_lin(config.open_threshold_db),
            close_lin: db_to_lin(config.close_threshold_db),
            floor_lin,
            attack_rate: span / config.attack_seconds,
            release_rate: span / config.release_seconds,
            hold_seconds: config.hold_seconds,
            sample_rate,
            detector: EnvelopeDetector::new(
                config.envelope_window_seconds,
                config.peak_mix,
                sample_rate,
            ),
            open: false,
            hold_remaining: 0.0,
            gain: floor_lin,
        })
    }

    /// Advance one block and return the gain to multiply into the signal.
    pub fn process_block(&mut self, samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return self.gain;
        }

        let env = self.detector.process_block(samples).blended;
        let dt = samples.len() as f32 / self.sample_rate;

        if self.open {
            if env >= self.close_lin {
                // Envelope touched the close threshold: hold re-arms.
                self.hold_remaining = self.hold_seconds;
            } else {
                self.hold_remaining -= dt;
                if self.hold_remaining <= 0.0 {
                    self.open = false;
                }
            }
        } else if env > self.open_lin {
            // Opening is immediate; transients must not be gated.
            self.open = true;
            self.hold_remaining = self.hold_seconds;
        }

        let (target, rate) = if self.open {
            (1.0, self.attack_rate)
        } else {
            (self.floor_lin, self.release_rate)
        };
        let max_step = rate * dt;
        self.gain += (target - self.gain).clamp(-max_step, max_step);
        self.gain = self.gain.clamp(self.floor_lin, 1.0);
        self.gain
    }

    /// Current gain without advancing.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Whether the state machine is in its Open state.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Return to the closed, floor-gain state.
    pub fn reset(&mut self) {
        self.detector.reset();
        self.open = false;
        self.hold_remaining = 0.0;
        self.gain = self.floor_lin;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::level::db_to_lin;

    const SAMPLE_RATE: f32 = 48_000.0;
    // 1 ms blocks keep the timing assertions easy to read.
    const BLOCK: usize = 48;

    fn tone_block(amplitude: f32) -> [f32; BLOCK] {
        // One cycle of 1 kHz at 48 kHz.
        let mut block = [0.0f32; BLOCK];
        for (i, s) in block.iter_mut().enumerate() {
            *s = amplitude * (i as f32 / BLOCK as f32 * std::f32::consts::TAU).sin();
        }
        block
    }

    fn scenario_config() -> GateConfig {
        GateConfig {
            open_threshold_db: -50.0,
            close_threshold_db: -58.0,
            attack_seconds: 0.001,
            release_seconds: 0.1,
            envelope_window_seconds: 0.002,
            peak_mix: 0.8,
            floor_db: -80.0,
            hold_seconds: 0.01,
        }
    }

    #[test]
    fn insufficient_hysteresis_is_rejected() {
        let mut config = GateConfig::default();

        config.open_threshold_db = -50.0;
        config.close_threshold_db = -48.0; // close above open
        assert!(matches!(
            HystereticGate::new(config, SAMPLE_RATE),
            Err(ConfigError::GateThresholds { .. })
        ));

        config.close_threshold_db = -52.0; // exactly 2 dB below: still rejected
        assert!(HystereticGate::new(config, SAMPLE_RATE).is_err());

        config.close_threshold_db = -58.0;
        assert!(HystereticGate::new(config, SAMPLE_RATE).is_ok());
    }

    #[test]
    fn non_positive_sample_rate_is_rejected() {
        for rate in [0.0, -48_000.0, f32::NAN] {
            assert!(matches!(
                HystereticGate::new(GateConfig::default(), rate),
                Err(ConfigError::NonPositiveTime { .. })
            ));
        }
    }

    #[test]
    fn gain_stays_within_floor_and_unity() {
        let mut gate = HystereticGate::new(scenario_config(), SAMPLE_RATE).unwrap();
        let floor = db_to_lin(-80.0);

        for i in 0..2_000 {
            // Alternate loud and silent stretches, with an absurd spike.
            let amp = match i % 40 {
                0..=9 => 1.0,
                10 => 100.0,
                _ => 0.0,
            };
            let gain = gate.process_block(&tone_block(amp));
            assert!((floor..=1.0).contains(&gain), "gain {gain} escaped range");
        }
    }

    #[test]
    fn opens_within_five_ms_of_a_minus_forty_db_tone() {
        let mut gate = HystereticGate::new(scenario_config(), SAMPLE_RATE).unwrap();
        let block = tone_block(db_to_lin(-40.0));

        let mut gain = 0.0;
        for _ in 0..5 {
            gain = gate.process_block(&block);
        }

        assert!(gate.is_open());
        assert!(gain > 0.99, "gate only reached {gain} after 5 ms");
    }

    #[test]
    fn closes_after_hold_plus_release_once_silent() {
        let mut gate = HystereticGate::new(scenario_config(), SAMPLE_RATE).unwrap();
        let tone = tone_block(db_to_lin(-40.0));
        let silence = [0.0f32; BLOCK];
        let floor = db_to_lin(-80.0);

        // 0.5 s of tone: fully open.
        for _ in 0..500 {
            gate.process_block(&tone);
        }
        assert!(gate.gain() > 0.99);

        // Hold keeps it open through the first 10 ms of silence.
        let mut gain = 1.0;
        for _ in 0..10 {
            gain = gate.process_block(&silence);
        }
        assert!(gain > 0.9, "gate collapsed during hold: {gain}");

        // Envelope decay (~9 ms) + hold (10 ms) + release (100 ms) bounds
        // full closure at roughly 120 ms.
        for _ in 10..125 {
            gain = gate.process_block(&silence);
        }
        assert!(!gate.is_open());
        assert!(
            gain <= floor * 1.5,
            "gate should be at its floor after release, got {gain}"
        );
    }

    #[test]
    fn signal_below_open_threshold_never_opens() {
        let mut gate = HystereticGate::new(scenario_config(), SAMPLE_RATE).unwrap();

        // Oscillating between -60 dB and -55 dB, both under open = -50 dB.
        let quiet = tone_block(db_to_lin(-60.0));
        let louder = tone_block(db_to_lin(-55.0));

        let mut transitions = 0;
        let mut was_open = gate.is_open();
        for i in 0..1_000 {
            let block = if i % 2 == 0 { &quiet } else { &louder };
            gate.process_block(block);
            if gate.is_open() != was_open {
                transitions += 1;
                was_open = gate.is_open();
            }
        }

        assert_eq!(transitions, 0);
        assert!(gate.gain() < db_to_lin(-70.0));
    }

    #[test]
    fn hovering_near_close_threshold_does_not_chatter() {
        let mut config = scenario_config();
        config.hold_seconds = 0.05;
        let mut gate = HystereticGate::new(config, SAMPLE_RATE).unwrap();

        // Open with a solid signal first.
        let loud = tone_block(db_to_lin(-30.0));
        for _ in 0..50 {
            gate.process_block(&loud);
        }
        assert!(gate.is_open());

        // One second straddling the close threshold (-58 dB): at most one
        // transition per hold window.
        let above = tone_block(db_to_lin(-55.0));
        let below = tone_block(db_to_lin(-60.0));
        let mut transitions = 0;
        let mut was_open = gate.is_open();
        for i in 0..1_000 {
            let block = if i % 2 == 0 { &above } else { &below };
            gate.process_block(block);
            if gate.is_open() != was_open {
                transitions += 1;
                was_open = gate.is_open();
            }
        }

        let max_allowed = (1.0 / config.hold_seconds) as i32; // 20 per second
        assert!(
            transitions <= max_allowed,
            "{transitions} transitions in 1 s exceeds hold-limited bound {max_allowed}"
        );
    }
}
