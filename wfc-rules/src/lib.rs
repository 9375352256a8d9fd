//! Domain alphabets and hard-coded constraint tables for the grid solvers.
//!
//! Two alphabets live here: the terrain [`Tile`] set used for map generation
//! and the Sudoku [`Digit`] set. Neither is data-driven; each carries its own
//! fixed constraint logic ([`AdjacencyTable`] and the peer geometry in
//! [`sudoku`]).

use thiserror::Error;

pub mod sudoku;
pub mod terrain;
pub mod tile;
pub mod types;

pub use sudoku::{BlockLayout, Digit};
pub use terrain::AdjacencyTable;
pub use tile::Tile;
pub use types::Symbol;

/// Errors raised when decoding raw values into alphabet members.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    /// A tile bitmask used bits outside the four tile flags.
    #[error("Tile mask must be in 0..16, got {0}")]
    InvalidMask(u8),
    /// A single flag did not name exactly one tile.
    #[error("Value {0} is not a single tile flag")]
    InvalidFlag(u8),
    /// A Sudoku digit was outside 1..=9.
    #[error("Sudoku digits must be in 1..=9, got {0}")]
    InvalidDigit(u8),
}
