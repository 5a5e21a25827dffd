//! Helpers for the application that drives a [`Solver`](crate::world::Solver):
//! spawning, colouring and frame pacing. None of this is needed to run the
//! solver itself.

pub mod emitter;
pub mod fixed_step;

pub use emitter::{rainbow, Emitter};
pub use fixed_step::{FixedStep, StepBudget};
