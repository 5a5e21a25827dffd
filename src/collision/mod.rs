pub mod aabb;
pub mod detection;
pub mod manifold;
pub mod resolver;
pub mod spatial_grid;

// Re-export key types
pub use aabb::AABB;
pub use detection::check_circle_circle;
pub use manifold::CollisionManifold;
pub use resolver::{BroadPhase, CollisionResolver};
pub use spatial_grid::SpatialGrid;
