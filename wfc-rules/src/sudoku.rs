//! Sudoku alphabet and peer geometry.
//!
//! Coordinates in this module are `(row, col)` pairs on the 9×9 board.

use crate::{RulesError, Symbol};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Side length of the board.
pub const SIZE: usize = 9;
/// Side length of one box.
pub const BOX: usize = 3;

/// A Sudoku value in `1..=9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Digit(u8);

impl Digit {
    /// Validates and wraps a raw value.
    pub fn new(value: u8) -> Result<Self, RulesError> {
        if (1..=9).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RulesError::InvalidDigit(value))
        }
    }

    /// The raw value in `1..=9`.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Symbol for Digit {
    const ALL: &'static [Self] = &[
        Self(1),
        Self(2),
        Self(3),
        Self(4),
        Self(5),
        Self(6),
        Self(7),
        Self(8),
        Self(9),
    ];

    fn index(self) -> usize {
        usize::from(self.0) - 1
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the top-left corner of a cell's box is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum BlockLayout {
    /// `(row / 3, col / 3) * 3`: the box that contains the cell.
    #[default]
    Quotient,
    /// `(row % 3, col % 3) * 3`: box chosen by the cell's position inside
    /// its own box. Only coincides with the containing box on the
    /// diagonal of box positions.
    Residue,
}

impl BlockLayout {
    /// Top-left `(row, col)` of the box paired with `(row, col)`.
    pub const fn origin(self, row: usize, col: usize) -> (usize, usize) {
        match self {
            Self::Quotient => ((row / BOX) * BOX, (col / BOX) * BOX),
            Self::Residue => ((row % BOX) * BOX, (col % BOX) * BOX),
        }
    }
}

/// The 8 other cells in `row`.
pub fn row_peers(row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..SIZE).filter(move |&c| c != col).map(move |c| (row, c))
}

/// The 8 other cells in `col`.
pub fn column_peers(row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..SIZE).filter(move |&r| r != row).map(move |r| (r, col))
}

/// The cells of the box paired with `(row, col)` under `layout`, minus the
/// cell itself when it lies inside.
pub fn box_peers(
    layout: BlockLayout,
    row: usize,
    col: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let (top, left) = layout.origin(row, col);
    (top..top + BOX)
        .flat_map(move |r| (left..left + BOX).map(move |c| (r, c)))
        .filter(move |&cell| cell != (row, col))
}

/// Row, column and box peers in that order, without duplicates.
pub fn peers(layout: BlockLayout, row: usize, col: usize) -> Vec<(usize, usize)> {
    let mut out: Vec<(usize, usize)> = Vec::with_capacity(3 * (SIZE - 1));
    for cell in row_peers(row, col)
        .chain(column_peers(row, col))
        .chain(box_peers(layout, row, col))
    {
        if !out.contains(&cell) {
            out.push(cell);
        }
    }
    out
}

/// A row, column or box of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// A row index.
    Row(usize),
    /// A column index.
    Column(usize),
    /// Top-left `(row, col)` of a box.
    Box(usize, usize),
}

impl Unit {
    /// The nine cells of the unit.
    pub fn cells(self) -> Vec<(usize, usize)> {
        match self {
            Self::Row(row) => (0..SIZE).map(|col| (row, col)).collect(),
            Self::Column(col) => (0..SIZE).map(|row| (row, col)).collect(),
            Self::Box(top, left) => (top..top + BOX)
                .flat_map(|r| (left..left + BOX).map(move |c| (r, c)))
                .collect(),
        }
    }

    /// All 27 units: rows, then columns, then the nine containing boxes.
    pub fn all() -> impl Iterator<Item = Self> {
        let rows = (0..SIZE).map(Self::Row);
        let cols = (0..SIZE).map(Self::Column);
        let boxes = (0..SIZE).map(|i| Self::Box((i / BOX) * BOX, (i % BOX) * BOX));
        rows.chain(cols).chain(boxes)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row(row) => write!(f, "row {row}"),
            Self::Column(col) => write!(f, "column {col}"),
            Self::Box(top, left) => write!(f, "box at ({top}, {left})"),
        }
    }
}

/// Units of a finished board, indexed `[row][col]`, that do not hold each
/// of 1..=9 exactly once.
///
/// Boxes are always the nine containing 3×3 boxes, whatever [`BlockLayout`]
/// the board was solved under.
pub fn check_solution(board: &[[u8; SIZE]; SIZE]) -> Vec<Unit> {
    Unit::all()
        .filter(|unit| {
            let mut seen = [false; SIZE + 1];
            !unit.cells().into_iter().all(|(r, c)| {
                let d = usize::from(board[r][c]);
                (1..=SIZE).contains(&d) && !std::mem::replace(&mut seen[d], true)
            })
        })
        .collect()
}
