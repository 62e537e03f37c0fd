//! Room discovery and neighbor linking for one grid object
//!
//! A full scan floods every unassigned open area once. Areas that never
//! reach true vacuum become rooms; everything reachable gets its edges.
//! Later, single tiles are re-linked and re-classified as they change,
//! without re-flooding the room around them.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use hashbrown::HashSet;
use log::{debug, info, trace};
use serde::Serialize;

use super::{NodeGraph, NodeIndex, NodeType};
use crate::atmos::{AtmosSolver, FrameContext};
use crate::error::GridError;
use crate::grid::{Directions, GridBounds, GridId, GridRegistry, LocalPos, Tile, TileMap};
use crate::options::AtmosOptions;

/// Tiles swept together by one flood fill
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomAssignment {
    /// In discovery order, origin first
    pub tiles: Vec<Tile>,
    /// No tile of the area reaches true vacuum
    pub sealed: bool,
}

/// Outcome of a full-grid scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryReport {
    pub grid: GridId,
    /// Sealed areas found
    pub rooms: usize,
    pub room_tiles: usize,
    /// Passable floor left unassigned because its area leaks
    pub open_tiles: usize,
    pub space_tiles: usize,
    pub occupied_tiles: usize,
    pub boundary_tiles: usize,
    pub elapsed: Duration,
}

/// What lies in a cell that is space on the local grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Beyond {
    Vacuum,
    Grid(GridId, LocalPos),
}

/// Keeps the room graph of one grid object current.
///
/// Boundary flags live in the shared `NodeGraph`, so an update on one grid
/// can refresh the tiles of a docked grid it touches.
#[derive(Debug, Clone)]
pub struct RoomGraphBuilder {
    grid: GridId,
    options: AtmosOptions,
}

impl RoomGraphBuilder {
    /// Create the builder of `grid`, which must be registered
    pub fn new(
        grid: GridId,
        registry: &dyn GridRegistry,
        options: AtmosOptions,
    ) -> Result<Self, GridError> {
        if registry.tile_map(grid).is_none() {
            return Err(GridError::UnknownGrid(grid));
        }
        Ok(Self { grid, options })
    }

    pub fn grid(&self) -> GridId {
        self.grid
    }

    pub fn options(&self) -> &AtmosOptions {
        &self.options
    }

    pub fn priority(&self) -> i32 {
        self.options.priority
    }

    pub fn is_boundary(&self, graph: &NodeGraph, tile: Tile) -> bool {
        tile.grid == self.grid && graph.is_boundary(tile)
    }

    /// Tiles of this grid facing true vacuum, in tile order
    pub fn boundary_tiles<'g>(&self, graph: &'g NodeGraph) -> impl Iterator<Item = Tile> + 'g {
        graph.boundary_tiles(self.grid)
    }

    pub fn boundary_len(&self, graph: &NodeGraph) -> usize {
        graph.boundary_tiles(self.grid).count()
    }

    /// Scan every tile of the grid
    pub fn initialize(
        &mut self,
        registry: &dyn GridRegistry,
        graph: &mut NodeGraph,
    ) -> DiscoveryReport {
        let start = Instant::now();
        let mut scan = self.scan(registry, graph);
        let bounds = scan.map.bounds();

        let mut swept = HashSet::new();
        let mut rooms = 0;
        for pos in bounds.positions() {
            if let Some(assignment) = scan.discover_at(pos, &mut swept) {
                if assignment.sealed {
                    rooms += 1;
                }
            }
        }

        let mut report = DiscoveryReport {
            grid: self.grid,
            rooms,
            ..DiscoveryReport::default()
        };
        for pos in bounds.positions() {
            match graph.classification_of(Tile::at(self.grid, pos)) {
                NodeType::Room => report.room_tiles += 1,
                NodeType::Space => report.space_tiles += 1,
                NodeType::Occupied => report.occupied_tiles += 1,
                NodeType::Unset => report.open_tiles += 1,
            }
        }
        report.boundary_tiles = self.boundary_len(graph);
        report.elapsed = start.elapsed();

        if self.options.report_init_timing {
            info!(
                "{} room graph ready in {} ms: {} rooms ({} tiles), {} open, {} space, {} occupied, {} boundary",
                self.grid,
                report.elapsed.as_millis(),
                report.rooms,
                report.room_tiles,
                report.open_tiles,
                report.space_tiles,
                report.occupied_tiles,
                report.boundary_tiles
            );
        } else {
            info!(
                "{} room graph ready: {} rooms ({} tiles), {} open, {} space, {} occupied, {} boundary",
                self.grid,
                report.rooms,
                report.room_tiles,
                report.open_tiles,
                report.space_tiles,
                report.occupied_tiles,
                report.boundary_tiles
            );
        }
        report
    }

    /// Classify one tile, flooding its area if it is unassigned open floor.
    ///
    /// Returns the flood fill result when one ran.
    ///
    /// # Panics
    /// If `tile` is not inside this builder's grid.
    pub fn discover_at(
        &mut self,
        registry: &dyn GridRegistry,
        graph: &mut NodeGraph,
        tile: Tile,
    ) -> Option<RoomAssignment> {
        let mut scan = self.scan(registry, graph);
        let pos = scan.checked_pos(tile);
        scan.discover_at(pos, &mut HashSet::new())
    }

    /// Re-link and re-classify a tile whose passability changed.
    ///
    /// Only the tile itself is re-classified; the room around it is not
    /// flooded again. Neighbors on this grid and on any grid touching the
    /// tile in the world get fresh edges and vacuum flags.
    ///
    /// # Panics
    /// If `tile` is not inside this builder's grid.
    pub fn incremental_update(
        &mut self,
        registry: &dyn GridRegistry,
        graph: &mut NodeGraph,
        tile: Tile,
    ) -> NodeType {
        let mut scan = self.scan(registry, graph);
        let pos = scan.checked_pos(tile);
        let mut foreign = scan.foreign_links(pos);

        let kind = if !scan.map.is_atmos_passable(pos) {
            scan.mark_occupied(pos);
            NodeType::Occupied
        } else if scan.map.is_space(pos) {
            scan.mark_space(pos);
            NodeType::Space
        } else {
            let idx = scan.link_neighbors(pos);
            let kind = scan.classify_single(idx);
            scan.graph.set_kind(idx, kind);
            kind
        };

        // Neighbors may now face space through this tile
        let bounds = scan.map.bounds();
        for (_, neighbor) in pos.neighbors() {
            if bounds.contains(neighbor) && scan.is_room_candidate(neighbor) {
                scan.link_neighbors(neighbor);
            }
        }

        foreign.extend(scan.foreign_adjacent(pos));
        foreign.sort_unstable();
        foreign.dedup();
        for other in foreign {
            // Grids that were never scanned are left to their own builder
            if graph.index_of(other).is_none() {
                continue;
            }
            let Some(mut scan) = Scan::new(other.grid, self.options.cross_grid_links, registry, graph)
            else {
                continue;
            };
            if scan.is_room_candidate(other.pos()) {
                scan.link_neighbors(other.pos());
            }
        }

        debug!("{tile} updated: {kind}");
        kind
    }

    /// Queue every boundary tile of this grid for the atmospherics solver
    pub fn tick<S: AtmosSolver + ?Sized>(
        &self,
        graph: &NodeGraph,
        ctx: &FrameContext,
        solver: &mut S,
    ) -> usize {
        let mut queued = 0;
        for tile in graph.boundary_tiles(self.grid) {
            solver.update_at(tile);
            queued += 1;
        }
        trace!("{} frame {}: {queued} boundary tiles queued", self.grid, ctx.frame);
        queued
    }

    fn scan<'a>(&self, registry: &'a dyn GridRegistry, graph: &'a mut NodeGraph) -> Scan<'a> {
        match Scan::new(self.grid, self.options.cross_grid_links, registry, graph) {
            Some(scan) => scan,
            None => panic!("{} is no longer registered", self.grid),
        }
    }
}

/// Borrowed state for one builder call
struct Scan<'a> {
    grid: GridId,
    cross_grid: bool,
    registry: &'a dyn GridRegistry,
    map: &'a dyn TileMap,
    graph: &'a mut NodeGraph,
}

impl<'a> Scan<'a> {
    fn new(
        grid: GridId,
        cross_grid: bool,
        registry: &'a dyn GridRegistry,
        graph: &'a mut NodeGraph,
    ) -> Option<Self> {
        let map = registry.tile_map(grid)?;
        Some(Self {
            grid,
            cross_grid,
            registry,
            map,
            graph,
        })
    }

    fn tile(&self, pos: LocalPos) -> Tile {
        Tile::at(self.grid, pos)
    }

    fn checked_pos(&self, tile: Tile) -> LocalPos {
        assert_eq!(
            tile.grid, self.grid,
            "{tile} passed to the builder of {}",
            self.grid
        );
        let bounds: GridBounds = self.map.bounds();
        assert!(
            bounds.contains(tile.pos()),
            "{tile} outside grid bounds {}..{}",
            bounds.min,
            bounds.max()
        );
        tile.pos()
    }

    fn is_room_candidate(&self, pos: LocalPos) -> bool {
        self.map.is_atmos_passable(pos) && !self.map.is_space(pos)
    }

    /// Resolve a locally-space cell through the registry, looking up the
    /// world point of that cell itself
    fn beyond(&self, pos: LocalPos) -> Beyond {
        if !self.cross_grid {
            return Beyond::Vacuum;
        }
        let Some(world) = self.registry.local_to_world(self.grid, pos) else {
            return Beyond::Vacuum;
        };
        self.registry
            .grid_at(world)
            .and_then(|other| {
                self.registry
                    .world_to_local(world, other)
                    .map(|local| Beyond::Grid(other, local))
            })
            .unwrap_or(Beyond::Vacuum)
    }

    /// Tiles of other grids currently linked to `pos`
    fn foreign_links(&self, pos: LocalPos) -> Vec<Tile> {
        let Some(node) = self.graph.get(self.tile(pos)) else {
            return Vec::new();
        };
        node.neighbors()
            .map(|idx| self.graph.node(idx).tile())
            .filter(|tile| tile.grid != self.grid)
            .collect()
    }

    /// Non-space tiles of other grids sitting next to `pos` in the world
    fn foreign_adjacent(&self, pos: LocalPos) -> Vec<Tile> {
        let mut tiles = Vec::new();
        for (_, neighbor) in pos.neighbors() {
            let Some(world) = self.registry.local_to_world(self.grid, neighbor) else {
                continue;
            };
            for other in self.registry.grids_at(world) {
                if other == self.grid {
                    continue;
                }
                if let Some(local) = self.registry.world_to_local(world, other) {
                    tiles.push(Tile::at(other, local));
                }
            }
        }
        tiles
    }

    fn discover_at(
        &mut self,
        pos: LocalPos,
        swept: &mut HashSet<LocalPos>,
    ) -> Option<RoomAssignment> {
        if self.is_room_candidate(pos) && !self.graph.is_room(self.tile(pos)) {
            if swept.contains(&pos) {
                return None;
            }
            return Some(self.flood_fill_room(pos, swept));
        }
        if !self.map.is_atmos_passable(pos) {
            self.mark_occupied(pos);
        } else if self.map.is_space(pos) {
            self.mark_space(pos);
        }
        None
    }

    fn flood_fill_room(&mut self, origin: LocalPos, swept: &mut HashSet<LocalPos>) -> RoomAssignment {
        let bounds = self.map.bounds();
        let mut queue = VecDeque::from([origin]);
        // Queued or accepted
        let mut seen: HashSet<LocalPos> = HashSet::new();
        seen.insert(origin);
        let mut accepted = Vec::new();
        let mut touches_open_space = false;

        while let Some(pos) = queue.pop_front() {
            accepted.push(pos);

            for (_, neighbor) in pos.neighbors() {
                if self.is_room_candidate(neighbor) {
                    if bounds.contains(neighbor)
                        && !seen.contains(&neighbor)
                        && !self.graph.is_room(self.tile(neighbor))
                    {
                        seen.insert(neighbor);
                        queue.push_back(neighbor);
                    }
                } else if self.map.is_space(neighbor) && self.beyond(neighbor) == Beyond::Vacuum {
                    touches_open_space = true;
                }
            }
        }

        let sealed = !touches_open_space;
        if sealed {
            for &pos in &accepted {
                let idx = self.graph.get_or_insert(self.tile(pos));
                self.graph.set_kind(idx, NodeType::Room);
            }
        }
        for &pos in &accepted {
            self.link_neighbors(pos);
        }
        swept.extend(accepted.iter().copied());

        debug!(
            "flood from {} swept {} tiles: {}",
            self.tile(origin),
            accepted.len(),
            if sealed { "sealed room" } else { "open to space" }
        );

        RoomAssignment {
            tiles: accepted.into_iter().map(|pos| self.tile(pos)).collect(),
            sealed,
        }
    }

    /// Rebuild every edge of a tile from scratch
    fn link_neighbors(&mut self, pos: LocalPos) -> NodeIndex {
        let tile = self.tile(pos);
        let idx = self.graph.get_or_insert(tile);
        self.graph.unlink_all(idx);

        let mut vacuum = Directions::empty();
        for (dir, neighbor) in pos.neighbors() {
            if self.map.is_space(neighbor) {
                match self.beyond(neighbor) {
                    Beyond::Vacuum => vacuum |= dir.flag(),
                    Beyond::Grid(other, local) => {
                        let passable = self
                            .registry
                            .tile_map(other)
                            .is_some_and(|map| map.is_atmos_passable(local));
                        if passable {
                            let foreign = self.graph.get_or_insert(Tile::at(other, local));
                            self.graph.link(idx, foreign);
                        }
                    }
                }
                continue;
            }

            if self.map.is_atmos_passable(neighbor) {
                let local = self.graph.get_or_insert(self.tile(neighbor));
                self.graph.link(idx, local);
            }
        }

        if self.graph.set_vacuum(idx, vacuum) {
            trace!("{tile} faces vacuum {vacuum:?}");
        }
        idx
    }

    fn mark_occupied(&mut self, pos: LocalPos) {
        self.strip(pos, NodeType::Occupied);
    }

    /// Space tiles carry no edges; the floor next to them holds the vacuum flag
    fn mark_space(&mut self, pos: LocalPos) {
        self.strip(pos, NodeType::Space);
    }

    fn strip(&mut self, pos: LocalPos, kind: NodeType) {
        let idx = self.graph.get_or_insert(self.tile(pos));
        self.graph.set_kind(idx, kind);
        self.graph.unlink_all(idx);
        self.graph.set_vacuum(idx, Directions::empty());
    }

    /// Classify a freshly linked floor tile from its own edges only
    fn classify_single(&self, idx: NodeIndex) -> NodeType {
        let node = self.graph.node(idx);
        if node.is_boundary() {
            return NodeType::Space;
        }

        let mut open = false;
        for other in node.neighbors() {
            match self.graph.node(other).kind() {
                NodeType::Space => return NodeType::Space,
                NodeType::Unset => open = true,
                NodeType::Room | NodeType::Occupied => {}
            }
        }
        if open { NodeType::Unset } else { NodeType::Room }
    }
}
