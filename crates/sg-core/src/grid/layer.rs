//! Tile layers: what occupies each cell of a grid

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::{GridBounds, LocalPos};
use crate::consts::{DOOR_CLOSED_SYM, DOOR_OPEN_SYM, FLOOR_SYM, SPACE_SYM, WALL_SYM, WINDOW_SYM};
use crate::error::GridError;

/// Query layer of one grid object.
///
/// Positions outside `bounds()` must read as passable space; the flood fill
/// and neighbor linking probe one cell past the rim of the grid.
pub trait TileMap {
    fn bounds(&self) -> GridBounds;

    /// Whether gas can move through the cell
    fn is_atmos_passable(&self, pos: LocalPos) -> bool;

    /// Whether the cell has no floor at all
    fn is_space(&self, pos: LocalPos) -> bool;
}

/// Cell contents
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum TileKind {
    #[default]
    Space = 0,
    Floor = 1,
    Wall = 2,
    Window = 3,
    DoorOpen = 4,
    DoorClosed = 5,
}

impl TileKind {
    pub const fn is_atmos_passable(&self) -> bool {
        matches!(self, TileKind::Space | TileKind::Floor | TileKind::DoorOpen)
    }

    pub const fn is_space(&self) -> bool {
        matches!(self, TileKind::Space)
    }

    pub const fn symbol(&self) -> char {
        match self {
            TileKind::Space => SPACE_SYM,
            TileKind::Floor => FLOOR_SYM,
            TileKind::Wall => WALL_SYM,
            TileKind::Window => WINDOW_SYM,
            TileKind::DoorOpen => DOOR_OPEN_SYM,
            TileKind::DoorClosed => DOOR_CLOSED_SYM,
        }
    }

    /// Parse a map symbol; a blank also reads as space
    pub const fn from_symbol(symbol: char) -> Option<TileKind> {
        match symbol {
            SPACE_SYM | ' ' => Some(TileKind::Space),
            FLOOR_SYM => Some(TileKind::Floor),
            WALL_SYM => Some(TileKind::Wall),
            WINDOW_SYM => Some(TileKind::Window),
            DOOR_OPEN_SYM => Some(TileKind::DoorOpen),
            DOOR_CLOSED_SYM => Some(TileKind::DoorClosed),
            _ => None,
        }
    }
}

/// In-memory rectangular tile layer anchored at the local origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayer {
    width: i32,
    height: i32,
    /// Row-major, row 0 is the southmost row
    cells: Vec<TileKind>,
}

impl TileLayer {
    /// Create a layer filled with one kind
    pub fn new(width: i32, height: i32, fill: TileKind) -> Result<Self, GridError> {
        if width <= 0 || height <= 0 {
            return Err(GridError::EmptyLayer);
        }
        Ok(Self {
            width,
            height,
            cells: vec![fill; width as usize * height as usize],
        })
    }

    /// Parse a layer from map text.
    ///
    /// The first line is the northmost row. Short lines are padded with
    /// space, leading and trailing blank lines are ignored.
    pub fn from_ascii(text: &str) -> Result<Self, GridError> {
        let lines: Vec<&str> = text
            .lines()
            .skip_while(|line| line.trim().is_empty())
            .collect();
        let end = lines
            .iter()
            .rposition(|line| !line.trim().is_empty())
            .map_or(0, |i| i + 1);
        let lines = &lines[..end];

        let height = lines.len() as i32;
        let width = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0) as i32;

        let mut layer = Self::new(width, height, TileKind::Space)?;
        for (row, line) in lines.iter().enumerate() {
            let y = height - 1 - row as i32;
            for (column, symbol) in line.chars().enumerate() {
                let kind = TileKind::from_symbol(symbol).ok_or(GridError::UnknownSymbol {
                    symbol,
                    line: row + 1,
                    column: column + 1,
                })?;
                layer.set(LocalPos::new(column as i32, y), kind);
            }
        }
        Ok(layer)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn index(&self, pos: LocalPos) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width || pos.y >= self.height {
            return None;
        }
        Some(pos.y as usize * self.width as usize + pos.x as usize)
    }

    /// Cell contents; space outside the layer
    pub fn get(&self, pos: LocalPos) -> TileKind {
        self.index(pos)
            .map_or(TileKind::Space, |index| self.cells[index])
    }

    /// Replace a cell, returning what was there.
    ///
    /// # Panics
    /// If `pos` is outside the layer.
    pub fn set(&mut self, pos: LocalPos, kind: TileKind) -> TileKind {
        let Some(index) = self.index(pos) else {
            panic!("position {pos} outside {}x{} layer", self.width, self.height);
        };
        core::mem::replace(&mut self.cells[index], kind)
    }

    /// Fill a rectangle, clipped to the layer
    pub fn fill(&mut self, area: GridBounds, kind: TileKind) {
        for pos in area.positions() {
            if let Some(index) = self.index(pos) {
                self.cells[index] = kind;
            }
        }
    }

    /// Render back to map text, northmost row first
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height as usize);
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                out.push(self.get(LocalPos::new(x, y)).symbol());
            }
            out.push('\n');
        }
        out
    }
}

impl TileMap for TileLayer {
    fn bounds(&self) -> GridBounds {
        GridBounds::from_size(self.width, self.height)
    }

    fn is_atmos_passable(&self, pos: LocalPos) -> bool {
        self.get(pos).is_atmos_passable()
    }

    fn is_space(&self, pos: LocalPos) -> bool {
        self.get(pos).is_space()
    }
}
