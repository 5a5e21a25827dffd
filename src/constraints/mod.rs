pub mod boundary;

pub use boundary::CircularBoundary;
