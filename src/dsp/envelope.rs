/*
Hybrid Peak/RMS Envelope Detection
==================================

Both dynamics processors (gate, sag) need to know "how loud is the player
right now". Neither pure measure answers that well:

  peak   Reacts instantly. Good: transients are never missed. Bad: a single
         spike opens a gate, and the value collapses between waveform
         cycles, causing chatter.

  RMS    Averages energy over a window. Good: steady, musical. Bad: reacts
         late, so palm-muted staccato playing slips under a gate before the
         detector notices.

The detector therefore tracks both and blends them:

    blended = peak_mix * peak + (1 - peak_mix) * rms

peak_mix near 1 favors transient response, near 0 favors stability. The
stock amp models sit around 0.3.

Mechanics, per block:

  peak  decays by PEAK_DECAY per sample across blocks, then takes the
        max against this block's absolute maximum. A held, slowly-falling
        ceiling rather than an instantaneous value.

  rms   one-pole smoothing of the block mean-square with time constant
        `window_seconds`, square-rooted on output.

Silence must produce exactly 0 and non-finite input must never propagate:
the audio thread would rather report "quiet" than crash or emit NaN gains.
*/

/// Per-sample decay applied to the held peak between blocks.
const PEAK_DECAY: f32 = 0.995;

/// Snapshot of the detector after a block, read-only to consumers.
///
/// Carries no timestamp: the detector advances exactly one block per
/// `process_block` call, so elapsed time is always the block length over
/// the sample rate and never has to be tracked per update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnvelopeState {
    /// Decaying peak ceiling, linear amplitude.
    pub peak: f32,
    /// Smoothed RMS, linear amplitude.
    pub rms: f32,
    /// The peak/RMS blend the dynamics processors act on.
    pub blended: f32,
}

/// Streaming loudness estimator, one instance per dynamics processor.
#[derive(Debug, Clone)]
pub struct EnvelopeDetector {
    window_seconds: f32,
    peak_mix: f32,
    sample_rate: f32,

    peak: f32,
    mean_square: f32,
    state: EnvelopeState,
}

impl EnvelopeDetector {
    /// `window_seconds` is the RMS smoothing time constant, `peak_mix` the
    /// blend ratio in [0, 1]. Range checks happen in the owning processor's
    /// config validation; values passed here are assumed clean.
    pub fn new(window_seconds: f32, peak_mix: f32, sample_rate: f32) -> Self {
        Self {
            window_seconds: window_seconds.max(crate::MIN_TIME),
            peak_mix: peak_mix.clamp(0.0, 1.0),
            sample_rate,
            peak: 0.0,
            mean_square: 0.0,
            state: EnvelopeState::default(),
        }
    }

    /// Update from one audio block and return the new state.
    ///
    /// Realtime-safe: no allocation, no locking, output always finite and
    /// non-negative.
    pub fn process_block(&mut self, samples: &[f32]) -> EnvelopeState {
        if samples.is_empty() {
            return self.state;
        }

        let mut block_peak = 0.0f32;
        let mut sum_squares = 0.0f32;
        for &s in samples {
            // Non-finite input counts as silence rather than poisoning the
            // running state.
            let s = if s.is_finite() { s } else { 0.0 };
            block_peak = block_peak.max(s.abs());
            sum_squares += s * s;
        }
        let block_mean_square = sum_squares / samples.len() as f32;

        let block_dt = samples.len() as f32 / self.sample_rate;

        self.peak = block_peak.max(self.peak * PEAK_DECAY.powi(samples.len() as i32));

        let alpha = (-block_dt / self.window_seconds).exp();
        self.mean_square = alpha * self.mean_square + (1.0 - alpha) * block_mean_square;
        if !self.mean_square.is_finite() {
            self.mean_square = 0.0;
        }

        let rms = self.mean_square.max(0.0).sqrt();
        self.state = EnvelopeState {
            peak: self.peak,
            rms,
            blended: self.peak_mix * self.peak + (1.0 - self.peak_mix) * rms,
        };
        self.state
    }

    /// Last computed state without advancing.
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Zero all running state, as on processor instantiation.
    pub fn reset(&mut self) {
        self.peak = 0.0;
        self.mean_square = 0.0;
        self.state = EnvelopeState::default();
    }
}
