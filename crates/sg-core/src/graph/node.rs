//! Tile nodes and the node arena

use std::collections::BTreeSet;

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::grid::{Directions, GridBounds, GridId, Tile};

/// Atmospheric classification of a tile
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum NodeType {
    /// Not classified yet, or part of an area open to vacuum
    #[default]
    Unset = 0,
    /// Inside a sealed room
    Room = 1,
    /// Exposed to space
    Space = 2,
    /// Blocked by a wall, window or closed door
    Occupied = 3,
}

impl NodeType {
    /// Debug map symbol
    pub const fn symbol(&self) -> char {
        match self {
            NodeType::Unset => '?',
            NodeType::Room => '.',
            NodeType::Space => '~',
            NodeType::Occupied => '#',
        }
    }
}

/// Index of a node in its `NodeGraph`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(u32);

impl NodeIndex {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Per-tile atmospheric record
#[derive(Debug, Clone)]
pub struct TileNode {
    tile: Tile,
    kind: NodeType,
    /// Back references; always mirrored on the other side
    neighbors: HashSet<NodeIndex>,
    /// Directions resolving to true vacuum
    vacuum: Directions,
}

impl TileNode {
    fn new(tile: Tile) -> Self {
        Self {
            tile,
            kind: NodeType::Unset,
            neighbors: HashSet::new(),
            vacuum: Directions::empty(),
        }
    }

    pub fn tile(&self) -> Tile {
        self.tile
    }

    pub fn kind(&self) -> NodeType {
        self.kind
    }

    pub fn is_room(&self) -> bool {
        self.kind == NodeType::Room
    }

    pub fn neighbors(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.neighbors.iter().copied()
    }

    pub fn neighbor_count(&self) -> usize {
        self.neighbors.len()
    }

    pub fn vacuum(&self) -> Directions {
        self.vacuum
    }

    /// Faces true vacuum in at least one direction
    pub fn is_boundary(&self) -> bool {
        !self.vacuum.is_empty()
    }
}

/// Arena of tile nodes shared by every grid object of a station.
///
/// One node per tile, created on first access and never removed, so a
/// `NodeIndex` stays valid for the life of the graph.
#[derive(Debug, Clone, Default)]
pub struct NodeGraph {
    nodes: Vec<TileNode>,
    index: HashMap<Tile, NodeIndex>,
    /// Tiles with a non-empty vacuum set, every grid
    boundary: BTreeSet<Tile>,
}

impl NodeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node for `tile`, creating it if needed
    pub fn get_or_insert(&mut self, tile: Tile) -> NodeIndex {
        if let Some(&idx) = self.index.get(&tile) {
            return idx;
        }
        let idx = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(TileNode::new(tile));
        self.index.insert(tile, idx);
        idx
    }

    pub fn index_of(&self, tile: Tile) -> Option<NodeIndex> {
        self.index.get(&tile).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &TileNode {
        &self.nodes[idx.index()]
    }

    pub fn get(&self, tile: Tile) -> Option<&TileNode> {
        self.index_of(tile).map(|idx| self.node(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileNode> {
        self.nodes.iter()
    }

    /// Classification of a tile; `Unset` if it was never touched
    pub fn classification_of(&self, tile: Tile) -> NodeType {
        self.get(tile).map_or(NodeType::Unset, TileNode::kind)
    }

    pub fn is_room(&self, tile: Tile) -> bool {
        self.classification_of(tile) == NodeType::Room
    }

    /// Linked neighbors of a tile, sorted
    pub fn neighbors_of(&self, tile: Tile) -> Vec<Tile> {
        let Some(node) = self.get(tile) else {
            return Vec::new();
        };
        let mut tiles: Vec<Tile> = node.neighbors().map(|idx| self.node(idx).tile).collect();
        tiles.sort_unstable();
        tiles
    }

    pub fn is_boundary(&self, tile: Tile) -> bool {
        self.boundary.contains(&tile)
    }

    /// Boundary tiles of one grid, in tile order
    pub fn boundary_tiles(&self, grid: GridId) -> impl Iterator<Item = Tile> + '_ {
        let first = Tile::new(grid, i32::MIN, i32::MIN);
        let last = Tile::new(grid, i32::MAX, i32::MAX);
        self.boundary.range(first..=last).copied()
    }

    pub(crate) fn set_kind(&mut self, idx: NodeIndex, kind: NodeType) {
        self.nodes[idx.index()].kind = kind;
    }

    /// Returns true when the tile just became a boundary tile
    pub(crate) fn set_vacuum(&mut self, idx: NodeIndex, vacuum: Directions) -> bool {
        let node = &mut self.nodes[idx.index()];
        node.vacuum = vacuum;
        if vacuum.is_empty() {
            self.boundary.remove(&node.tile);
            false
        } else {
            self.boundary.insert(node.tile)
        }
    }

    /// Add a mutual edge; self loops are ignored
    pub(crate) fn link(&mut self, a: NodeIndex, b: NodeIndex) {
        if a == b {
            return;
        }
        self.nodes[a.index()].neighbors.insert(b);
        self.nodes[b.index()].neighbors.insert(a);
    }

    /// Drop every edge of `idx`, on both sides
    pub(crate) fn unlink_all(&mut self, idx: NodeIndex) {
        let neighbors = core::mem::take(&mut self.nodes[idx.index()].neighbors);
        for other in neighbors {
            self.nodes[other.index()].neighbors.remove(&idx);
        }
    }

    /// Every edge has its mirror
    pub fn is_symmetric(&self) -> bool {
        self.nodes.iter().enumerate().all(|(i, node)| {
            let idx = NodeIndex(i as u32);
            node.neighbors
                .iter()
                .all(|other| self.nodes[other.index()].neighbors.contains(&idx))
        })
    }

    /// Render the classification of one grid, northmost row first
    pub fn render_classification(&self, grid: GridId, bounds: GridBounds) -> String {
        let max = bounds.max();
        let mut out = String::with_capacity(bounds.area() + bounds.height.max(0) as usize);
        for y in (bounds.min.y..max.y).rev() {
            for x in bounds.min.x..max.x {
                out.push(self.classification_of(Tile::new(grid, x, y)).symbol());
            }
            out.push('\n');
        }
        out
    }
}
