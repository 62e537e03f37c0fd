//! Grid and world coordinates

use core::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Identifier of a grid object (a ship, a station section)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct GridId(pub u16);

impl fmt::Display for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grid#{}", self.0)
    }
}

/// Position on a single grid, in that grid's own frame
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct LocalPos {
    pub x: i32,
    pub y: i32,
}

impl LocalPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The adjacent position one cell away in `dir`
    pub const fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.offset();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The four orthogonal neighbors, in `Direction::ALL` order
    pub fn neighbors(self) -> [(Direction, LocalPos); 4] {
        Direction::ALL.map(|dir| (dir, self.step(dir)))
    }
}

impl fmt::Display for LocalPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Position in station space, shared by every grid object
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct WorldPos {
    pub x: i32,
    pub y: i32,
}

impl WorldPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for WorldPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "world({}, {})", self.x, self.y)
    }
}

/// A tile: one cell of one grid object.
///
/// Field order gives the ordering used everywhere iteration must be stable:
/// grid first, then rows south to north, then columns west to east.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Tile {
    pub grid: GridId,
    pub y: i32,
    pub x: i32,
}

impl Tile {
    pub const fn new(grid: GridId, x: i32, y: i32) -> Self {
        Self { grid, y, x }
    }

    pub const fn at(grid: GridId, pos: LocalPos) -> Self {
        Self::new(grid, pos.x, pos.y)
    }

    pub const fn pos(&self) -> LocalPos {
        LocalPos::new(self.x, self.y)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@({}, {})", self.grid, self.x, self.y)
    }
}

/// Orthogonal direction; atmosphere only flows through shared edges
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumIter,
)]
#[repr(u8)]
pub enum Direction {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Cell offset, `+y` is north
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Single-bit set for this direction
    pub const fn flag(self) -> Directions {
        match self {
            Direction::North => Directions::NORTH,
            Direction::East => Directions::EAST,
            Direction::South => Directions::SOUTH,
            Direction::West => Directions::WEST,
        }
    }
}

bitflags! {
    /// Set of directions
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Directions: u8 {
        const NORTH = 0x01;
        const EAST = 0x02;
        const SOUTH = 0x04;
        const WEST = 0x08;
    }
}

impl Directions {
    /// Iterate the set in `Direction::ALL` order
    pub fn iter_directions(self) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .into_iter()
            .filter(move |dir| self.contains(dir.flag()))
    }
}

impl Serialize for Directions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Directions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(Directions::from_bits_truncate(bits))
    }
}

/// Rectangular extent of a grid, `min` inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridBounds {
    pub min: LocalPos,
    pub width: i32,
    pub height: i32,
}

impl GridBounds {
    pub const fn new(min: LocalPos, width: i32, height: i32) -> Self {
        Self { min, width, height }
    }

    /// Bounds anchored at the origin
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(LocalPos::new(0, 0), width, height)
    }

    /// Exclusive upper corner
    pub const fn max(&self) -> LocalPos {
        LocalPos::new(self.min.x + self.width, self.min.y + self.height)
    }

    pub const fn contains(&self, pos: LocalPos) -> bool {
        pos.x >= self.min.x
            && pos.y >= self.min.y
            && pos.x < self.min.x + self.width
            && pos.y < self.min.y + self.height
    }

    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Number of cells covered
    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.width as usize * self.height as usize
        }
    }

    /// Every position inside the bounds, x fastest, then y
    pub fn positions(self) -> impl Iterator<Item = LocalPos> {
        let max = self.max();
        (self.min.y..max.y).flat_map(move |y| (self.min.x..max.x).map(move |x| LocalPos::new(x, y)))
    }
}
