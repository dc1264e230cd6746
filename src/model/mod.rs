//! Amplifier topology as data.
//!
//! An amplifier model is a declarative list of typed stages plus a static
//! connection list, built once from configuration. The alternative — one
//! hand-wired class per amp — duplicates the same routing twenty-five
//! times over and makes every new model a code change instead of a data
//! change.
//!
//! This layer never touches audio. The host's processing graph instantiates
//! the described stages (using [`crate::dsp`] for curves, gate and sag) and
//! executes them; [`AmpModel::validate`] runs every embedded config's
//! construction-time checks up front so a broken model is refused before
//! any audio flows.

/// Content-addressed cache of synthesized transfer curves.
pub mod cache;

use crate::dsp::curve::{CurveParams, MIN_RESOLUTION};
use crate::dsp::gate::GateConfig;
use crate::dsp::sag::SagConfig;
use crate::error::ConfigError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tone-shaping filter responses used by amp tone stacks.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterKind {
    /// Bass control.
    LowShelf,
    /// Mid control.
    Peaking,
    /// Treble / presence controls.
    HighShelf,
    LowPass,
    HighPass,
}

/// One stage of an amplifier's signal chain.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub enum StageDescriptor {
    /// Static gain stage.
    Gain { db: f32 },
    /// Tone-stack filter.
    Filter {
        kind: FilterKind,
        frequency_hz: f32,
        gain_db: f32,
        q: f32,
    },
    /// Waveshaping saturation stage; its table comes from
    /// [`cache::CurveCache`] at build time.
    Shaper {
        curve: CurveParams,
        resolution: usize,
    },
    /// Hysteretic noise gate.
    Gate(GateConfig),
    /// Power-supply sag simulator.
    Sag(SagConfig),
    /// Hand-off point to the opaque cabinet/impulse-response collaborator.
    CabinetSend,
}

/// Directed edge between two stage indices.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub from: usize,
    pub to: usize,
}

/// A complete amplifier model: stages plus routing, data only.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct AmpModel {
    pub name: String,
    pub stages: Vec<StageDescriptor>,
    pub connections: Vec<Connection>,
}

impl AmpModel {
    /// Run every embedded config's construction-time checks and verify the
    /// connection list, so instantiation can be refused before audio runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for stage in &self.stages {
            match stage {
                StageDescriptor::Shaper { curve, resolution } => {
                    curve.validate()?;
                    if *resolution < MIN_RESOLUTION {
                        return Err(ConfigError::CurveResolution(*resolution));
                    }
                }
                StageDescriptor::Gate(config) => config.validate()?,
                StageDescriptor::Sag(config) => config.validate()?,
                StageDescriptor::Gain { .. }
                | StageDescriptor::Filter { .. }
                | StageDescriptor::CabinetSend => {}
            }
        }

        for connection in &self.connections {
            if connection.from >= self.stages.len() || connection.to >= self.stages.len() {
                return Err(ConfigError::ConnectionOutOfRange {
                    from: connection.from,
                    to: connection.to,
                    stages: self.stages.len(),
                });
            }
        }

        log::debug!(
            "validated amp model '{}': {} stages, {} connections",
            self.name,
            self.stages.len(),
            self.connections.len()
        );
        Ok(())
    }
}
