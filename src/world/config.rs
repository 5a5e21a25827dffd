//! Configuration types for loading simulation scenarios from YAML.
//!
//! A scenario consists of:
//!
//! - [`SimulationConfig`] – solver settings (tick rate, sub-steps, gravity, boundary, broad phase)
//! - [`EmitterConfig`]    – how the demo spawns bodies
//! - [`FrameConfig`]      – how the outer loop paces ticks against wall-clock time
//! - [`ScenarioConfig`]   – top-level wrapper
//!
//! Every field has a default, so an empty document is a valid scenario.
//!
//! ```yaml
//! simulation:
//!   tick_dt: 0.033          # seconds per update(); or give update_rate instead
//!   sub_steps: 6
//!   gravity: { x: 0.0, y: 1000.0 }
//!   boundary:
//!     center: { x: 500.0, y: 500.0 }
//!     radius: 450.0
//!   broad_phase: { kind: uniform_grid }   # or { kind: all_pairs }
//!   collision_response: 1.0
//!
//! emitter:
//!   position: { x: 500.0, y: 200.0 }
//!   speed: 200.0
//!   min_radius: 12.0
//!   max_radius: 18.0
//!   max_objects: 700
//!   max_angle: 1.0
//!   spawn_delay: 0.033
//!
//! frame:
//!   max_frame_skip: 5
//! ```

use std::fmt;
use std::io::Read;

use serde::Deserialize;

use crate::collision::BroadPhase;
use crate::common::{error::positive_finite, SolverError};
use crate::math::vec2::Vec2;
use crate::world::solver::Solver;

/// Circular boundary placement.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct BoundaryConfig {
    pub center: Vec2,
    pub radius: f64,
}

/// Solver settings. Validated by `Solver::from_config`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_dt: f64,               // seconds advanced per update()
    pub update_rate: Option<f64>,   // ticks per second; overrides tick_dt when set
    pub sub_steps: u32,             // integration/constraint passes per tick
    pub gravity: Vec2,              // constant acceleration applied every sub-step
    pub boundary: Option<BoundaryConfig>, // None -> bodies are unconstrained
    pub broad_phase: BroadPhase,
    pub collision_response: f64,    // share of each overlap removed per visit, (0, 1]
}

impl SimulationConfig {
    /// Tick duration after applying `update_rate`, if any.
    pub fn effective_tick_dt(&self) -> Result<f64, SolverError> {
        match self.update_rate {
            Some(rate) if rate.is_finite() && rate > 0.0 => Ok(1.0 / rate),
            Some(rate) => Err(SolverError::InvalidUpdateRate(rate)),
            None => Ok(self.tick_dt),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_dt: 1.0 / 60.0,
            update_rate: None,
            sub_steps: 8,
            gravity: Vec2::new(0.0, 1000.0),
            boundary: Some(BoundaryConfig {
                center: Vec2::new(500.0, 500.0),
                radius: 450.0,
            }),
            broad_phase: BroadPhase::AllPairs,
            collision_response: 1.0,
        }
    }
}

/// Spawning schedule used by `scene::Emitter`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EmitterConfig {
    pub position: Vec2,
    pub speed: f64,       // launch speed; the solver seeds it over a whole tick
    pub min_radius: f64,
    pub max_radius: f64,
    pub max_objects: u32, // spawning stops at this count
    pub max_angle: f64,   // launch direction swings ±max_angle around straight down
    pub spawn_delay: f64, // minimum simulated seconds between spawns
}

impl EmitterConfig {
    /// Rejects non-positive radii and non-finite launch settings.
    pub fn validate(&self) -> Result<(), SolverError> {
        for radius in [self.min_radius, self.max_radius] {
            if !positive_finite(radius) {
                return Err(SolverError::InvalidRadius(radius));
            }
        }
        if !self.position.is_finite() || !self.speed.is_finite() || !self.max_angle.is_finite() {
            return Err(SolverError::NonFiniteVector);
        }
        Ok(())
    }
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            position: Vec2::new(500.0, 200.0),
            speed: 200.0,
            min_radius: 12.0,
            max_radius: 18.0,
            max_objects: 700,
            max_angle: 1.0,
            spawn_delay: 0.033,
        }
    }
}

/// Outer loop pacing.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FrameConfig {
    pub max_frame_skip: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { max_frame_skip: 5 }
    }
}

/// Top-level scenario file.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ScenarioConfig {
    pub simulation: SimulationConfig,
    pub emitter: EmitterConfig,
    pub frame: FrameConfig,
}

impl ScenarioConfig {
    /// Parses and validates a scenario.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let scenario: Self = serde_yaml::from_str(yaml)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Like [`ScenarioConfig::from_yaml_str`], reading from any source.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        let scenario: Self = serde_yaml::from_reader(reader)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Checks every value the solver and emitter would reject.
    pub fn validate(&self) -> Result<(), SolverError> {
        Solver::from_config(&self.simulation)?;
        self.emitter.validate()
    }
}

/// Failure to load a scenario.
#[derive(Debug)]
pub enum ConfigError {
    /// The document is not valid YAML for a scenario.
    Parse(serde_yaml::Error),
    /// The document parsed but holds values the solver rejects.
    Invalid(SolverError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(err) => write!(f, "failed to parse scenario: {}", err),
            ConfigError::Invalid(err) => write!(f, "invalid scenario: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(err) => Some(err),
            ConfigError::Invalid(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Parse(err)
    }
}

impl From<SolverError> for ConfigError {
    fn from(err: SolverError) -> Self {
        ConfigError::Invalid(err)
    }
}
