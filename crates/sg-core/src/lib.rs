//! sg-core: room and atmospheric neighbor discovery for station tile grids
//!
//! Every grid object (a ship, a station section) is scanned once to split
//! its tiles into sealed rooms, open space and occupied cells, and to link
//! each tile to the tiles air can flow to, including tiles of other grid
//! objects docked against it. Afterwards single tiles are re-evaluated as
//! walls and doors are built or destroyed, and the tiles facing open vacuum
//! are handed to the atmospherics solver once per frame.
//!
//! The crate holds no global state: the multi-grid registry, the node arena
//! and the solver sink are all passed in explicitly by the host.

pub mod atmos;
pub mod error;
pub mod graph;
pub mod grid;
pub mod options;

mod consts;

pub use atmos::{AtmosSolver, FrameContext, UpdateList};
pub use consts::*;
pub use error::GridError;
pub use graph::{
    DiscoveryReport, GraphSnapshot, NodeGraph, NodeIndex, NodeSnapshot, NodeType,
    RoomAssignment, RoomGraphBuilder, TileNode,
};
pub use grid::{
    Direction, Directions, GridBounds, GridId, GridRegistry, LocalPos, Placement, Rotation,
    StationRegistry, Tile, TileKind, TileLayer, TileMap, WorldPos,
};
pub use options::{AtmosOptions, OptionsError};
