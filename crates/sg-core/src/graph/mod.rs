//! Room graph
//!
//! Node arena with mutual atmospheric edges, and the per-grid builder that
//! discovers rooms and keeps edges current.

mod builder;
mod node;
mod snapshot;

pub use builder::{DiscoveryReport, RoomAssignment, RoomGraphBuilder};
pub use node::{NodeGraph, NodeIndex, NodeType, TileNode};
pub use snapshot::{GraphSnapshot, NodeSnapshot};
