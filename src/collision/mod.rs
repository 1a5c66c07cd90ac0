pub mod aabb;
pub mod detection;
pub mod manifold;
pub mod spatial_grid;

// Re-export key types
pub use aabb::AABB;
pub use detection::check_collision;
pub use manifold::{pair_key, CollisionRecord, Contact, Manifold, ManifoldArena};
pub use spatial_grid::{ChunkExtent, SpatialGrid};
