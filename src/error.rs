use thiserror::Error;

/// Construction-time configuration failures.
///
/// Every variant is raised before the realtime path ever runs: a bad config
/// refuses to build, so the audio callback never has to report an error.
/// Once a processor exists it always produces a valid gain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Gate hysteresis requires the close threshold to sit at least 2 dB
    /// below the open threshold, otherwise a signal hovering near a single
    /// threshold makes the gate chatter.
    #[error("gate close threshold {close_db} dB must be at least 2 dB below open threshold {open_db} dB")]
    GateThresholds { open_db: f32, close_db: f32 },

    /// Sag depth must stay inside (0, 1); 0 disables the effect entirely and
    /// 1 would allow the supply to collapse to nothing.
    #[error("sag depth {0} outside (0, 1)")]
    SagDepth(f32),

    /// Floor gain outside (0, 1). A real power supply never fully collapses
    /// and a gate floor of exactly zero produces an audible hard cut.
    #[error("{name} floor gain {value} outside (0, 1)")]
    FloorGain { name: &'static str, value: f32 },

    /// Sag response shape below 1.0 (1 = linear, >1 = progressive).
    #[error("sag response shape {0} must be >= 1")]
    SagShape(f32),

    /// Transfer curve resolution below the fidelity minimum; coarser tables
    /// cause audible stair-stepping.
    #[error("curve resolution {0} below minimum of 512")]
    CurveResolution(usize),

    /// Asymmetry offset outside [-0.2, 0.2].
    #[error("curve asymmetry offset {0} outside [-0.2, 0.2]")]
    CurveAsymmetry(f32),

    /// Soft-knee threshold or ratio outside (0, 1].
    #[error("curve soft knee threshold {threshold} / ratio {ratio} outside (0, 1]")]
    CurveKnee { threshold: f32, ratio: f32 },

    /// Curve drive must be positive.
    #[error("curve drive {0} must be positive")]
    CurveDrive(f32),

    /// A time constant that must be positive was zero or negative.
    #[error("{name} of {seconds} s must be positive")]
    NonPositiveTime { name: &'static str, seconds: f32 },

    /// Peak/RMS blend ratio outside [0, 1].
    #[error("peak mix ratio {0} outside [0, 1]")]
    PeakMix(f32),

    /// An amp model stage connection referenced a stage that does not exist.
    #[error("connection {from} -> {to} references a stage index outside 0..{stages}")]
    ConnectionOutOfRange { from: usize, to: usize, stages: usize },
}

pub(crate) fn check_positive_time(name: &'static str, seconds: f32) -> Result<(), ConfigError> {
    if seconds > 0.0 && seconds.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveTime { name, seconds })
    }
}

pub(crate) fn check_peak_mix(ratio: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&ratio) {
        Ok(())
    } else {
        Err(ConfigError::PeakMix(ratio))
    }
}
