//! Subsystem constants

/// Scheduling priority of the room graph subsystem.
///
/// Higher runs first; room data must be ready before any other per-grid
/// subsystem reads it.
pub const ROOM_GRAPH_PRIORITY: i32 = 100;

/// Symbol used for space tiles when rendering or parsing ASCII layers
pub const SPACE_SYM: char = '~';
pub const FLOOR_SYM: char = '.';
pub const WALL_SYM: char = '#';
pub const WINDOW_SYM: char = '=';
pub const DOOR_OPEN_SYM: char = '/';
pub const DOOR_CLOSED_SYM: char = '+';
