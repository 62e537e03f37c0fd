//! Grid construction errors
//!
//! Only recoverable setup problems are reported here. Querying a tile that
//! lies outside its grid is a caller bug and panics instead.

use thiserror::Error;

use crate::grid::GridId;

/// Errors raised while building layers or registering grid objects
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("no grid object registered as {0}")]
    UnknownGrid(GridId),

    #[error("grid object {0} is already registered")]
    DuplicateGrid(GridId),

    #[error("tile layer must have a non-zero width and height")]
    EmptyLayer,

    #[error("unknown tile symbol '{symbol}' at line {line}, column {column}")]
    UnknownSymbol {
        symbol: char,
        line: usize,
        column: usize,
    },
}
