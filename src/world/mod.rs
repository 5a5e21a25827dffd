pub mod config;
pub mod solver;

pub use config::{BoundaryConfig, ConfigError, EmitterConfig, FrameConfig, ScenarioConfig, SimulationConfig};
pub use solver::Solver;
