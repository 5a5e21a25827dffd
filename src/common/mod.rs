pub mod color;
pub mod error;

pub use color::Color;
pub use error::SolverError;
