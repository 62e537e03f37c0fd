//! Grid objects
//!
//! Coordinates, per-grid tile layers and the registry that resolves world
//! points to the grid object covering them.

mod layer;
mod pos;
mod registry;

pub use layer::{TileKind, TileLayer, TileMap};
pub use pos::{Direction, Directions, GridBounds, GridId, LocalPos, Tile, WorldPos};
pub use registry::{GridRegistry, Placement, Rotation, StationRegistry};
