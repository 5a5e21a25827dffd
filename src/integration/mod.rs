pub mod integrator;

pub use integrator::{integrate, integrate_all};
