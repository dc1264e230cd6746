pub mod automation; // Click-free parameter scheduling and path crossfades
pub mod dsp;
pub mod error;
pub mod model; // Declarative amplifier topology descriptors

pub use error::ConfigError;

/// Largest audio block the realtime path is sized for. Hosts may process
/// smaller blocks; larger ones should be split before they reach this crate.
pub const MAX_BLOCK_SIZE: usize = 2048;

pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
