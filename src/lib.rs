//! Position-Verlet solver for a pile of disks inside a circular boundary.
//!
//! ```
//! use verlet_engine::{Solver, Vec2};
//!
//! let mut solver = Solver::new();
//! solver.set_constraint(Vec2::new(500.0, 500.0), 450.0).unwrap();
//! solver.set_sub_steps_count(8).unwrap();
//! solver.set_simulation_update_rate(60.0).unwrap();
//!
//! let ball = solver.add_object(Vec2::new(500.0, 200.0), 15.0).unwrap();
//! solver.set_object_velocity(ball, Vec2::new(100.0, 0.0)).unwrap();
//! for _ in 0..60 {
//!     solver.update();
//! }
//! assert_eq!(solver.objects_count(), 1);
//! ```

pub mod collision;
pub mod common;
pub mod constraints;
pub mod integration;
pub mod math;
pub mod objects;
pub mod scene;
pub mod world;

// Re-export key types for easier use
pub use collision::BroadPhase;
pub use common::{Color, SolverError};
pub use constraints::CircularBoundary;
pub use math::vec2::Vec2;
pub use objects::{Body, BodyHandle};
pub use world::{ScenarioConfig, SimulationConfig, Solver};
