//! Multi-grid registry
//!
//! Grid objects move independently and may overlap, so adjacency between
//! tiles of different grids is only known in world coordinates. The
//! registry maps world points back to the grid object covering them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::{GridId, LocalPos, TileLayer, TileMap, WorldPos};
use crate::error::GridError;

/// Read-only view of every grid object on the station
pub trait GridRegistry {
    /// Query layer of a grid, `None` if the grid is unknown
    fn tile_map(&self, grid: GridId) -> Option<&dyn TileMap>;

    fn local_to_world(&self, grid: GridId, pos: LocalPos) -> Option<WorldPos>;

    fn world_to_local(&self, world: WorldPos, grid: GridId) -> Option<LocalPos>;

    /// Every grid object with a non-space tile at `world`, lowest id first.
    ///
    /// Space cells of a grid do not count as covering the point.
    fn grids_at(&self, world: WorldPos) -> Vec<GridId>;

    /// Lowest-id grid object covering `world`
    fn grid_at(&self, world: WorldPos) -> Option<GridId> {
        self.grids_at(world).first().copied()
    }

    /// True vacuum: no grid object covers the point
    fn is_space_at(&self, world: WorldPos) -> bool {
        self.grid_at(world).is_none()
    }
}

/// Quarter-turn rotation of a grid, counter-clockwise
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Rotation {
    #[default]
    R0 = 0,
    R90 = 1,
    R180 = 2,
    R270 = 3,
}

impl Rotation {
    pub const fn inverse(self) -> Rotation {
        match self {
            Rotation::R0 => Rotation::R0,
            Rotation::R90 => Rotation::R270,
            Rotation::R180 => Rotation::R180,
            Rotation::R270 => Rotation::R90,
        }
    }

    pub const fn apply(self, x: i32, y: i32) -> (i32, i32) {
        match self {
            Rotation::R0 => (x, y),
            Rotation::R90 => (-y, x),
            Rotation::R180 => (-x, -y),
            Rotation::R270 => (y, -x),
        }
    }
}

/// Where a grid's local origin sits in the world, and how it is turned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Placement {
    pub offset: WorldPos,
    pub rotation: Rotation,
}

impl Placement {
    pub const fn at(x: i32, y: i32) -> Self {
        Self {
            offset: WorldPos::new(x, y),
            rotation: Rotation::R0,
        }
    }

    pub const fn rotated(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub const fn to_world(&self, pos: LocalPos) -> WorldPos {
        let (x, y) = self.rotation.apply(pos.x, pos.y);
        WorldPos::new(x + self.offset.x, y + self.offset.y)
    }

    pub const fn to_local(&self, world: WorldPos) -> LocalPos {
        let (x, y) = self
            .rotation
            .inverse()
            .apply(world.x - self.offset.x, world.y - self.offset.y);
        LocalPos::new(x, y)
    }
}

#[derive(Debug, Clone)]
struct GridEntry {
    layer: TileLayer,
    placement: Placement,
}

/// Registry of in-memory grid objects
#[derive(Debug, Clone, Default)]
pub struct StationRegistry {
    grids: BTreeMap<GridId, GridEntry>,
}

impl StationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a grid object
    pub fn add_grid(
        &mut self,
        id: GridId,
        layer: TileLayer,
        placement: Placement,
    ) -> Result<(), GridError> {
        if self.grids.contains_key(&id) {
            return Err(GridError::DuplicateGrid(id));
        }
        self.grids.insert(id, GridEntry { layer, placement });
        Ok(())
    }

    /// Unregister a grid object, returning its layer
    pub fn remove_grid(&mut self, id: GridId) -> Result<TileLayer, GridError> {
        self.grids
            .remove(&id)
            .map(|entry| entry.layer)
            .ok_or(GridError::UnknownGrid(id))
    }

    pub fn layer(&self, id: GridId) -> Option<&TileLayer> {
        self.grids.get(&id).map(|entry| &entry.layer)
    }

    pub fn layer_mut(&mut self, id: GridId) -> Option<&mut TileLayer> {
        self.grids.get_mut(&id).map(|entry| &mut entry.layer)
    }

    pub fn placement(&self, id: GridId) -> Option<Placement> {
        self.grids.get(&id).map(|entry| entry.placement)
    }

    /// Move a grid object
    pub fn set_placement(&mut self, id: GridId, placement: Placement) -> Result<(), GridError> {
        let entry = self.grids.get_mut(&id).ok_or(GridError::UnknownGrid(id))?;
        entry.placement = placement;
        Ok(())
    }

    pub fn grid_ids(&self) -> impl Iterator<Item = GridId> + '_ {
        self.grids.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}

impl GridRegistry for StationRegistry {
    fn tile_map(&self, grid: GridId) -> Option<&dyn TileMap> {
        self.grids
            .get(&grid)
            .map(|entry| &entry.layer as &dyn TileMap)
    }

    fn local_to_world(&self, grid: GridId, pos: LocalPos) -> Option<WorldPos> {
        self.grids.get(&grid).map(|entry| entry.placement.to_world(pos))
    }

    fn world_to_local(&self, world: WorldPos, grid: GridId) -> Option<LocalPos> {
        self.grids.get(&grid).map(|entry| entry.placement.to_local(world))
    }

    fn grids_at(&self, world: WorldPos) -> Vec<GridId> {
        self.grids
            .iter()
            .filter_map(|(&id, entry)| {
                let local = entry.placement.to_local(world);
                let covered = entry.layer.bounds().contains(local) && !entry.layer.is_space(local);
                covered.then_some(id)
            })
            .collect()
    }
}
