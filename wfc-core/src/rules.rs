//! Constraint rules plugged into the solver.
//!
//! A rule decides which cells count as neighbors and what a cell's current
//! state strikes from them. The propagator and runner never look at the
//! alphabet directly; everything domain-specific goes through
//! [`ConstraintRule`].

use crate::cell::Cell;
use crate::grid::{GridError, PossibilityGrid};
use std::fmt::Debug;
use thiserror::Error;
use wfc_rules::sudoku::{self, Unit, SIZE};
use wfc_rules::{AdjacencyTable, BlockLayout, Digit, Symbol, Tile};

/// Ways a finished grid can break its rule.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolutionError {
    /// A cell holds no committed value.
    #[error("Cell ({0}, {1}) is unresolved")]
    Unresolved(usize, usize),
    /// A Sudoku row, column or box does not hold each digit once.
    #[error("Sudoku {0} does not hold each digit exactly once")]
    Incomplete(Unit),
    /// Two orthogonal neighbors may not touch.
    #[error("{tile} at {at:?} may not touch {other} at {other_at:?}")]
    Adjacency {
        /// First cell of the pair.
        at: (usize, usize),
        /// Its tile.
        tile: Tile,
        /// The neighbor right of or below `at`.
        other_at: (usize, usize),
        /// The neighbor's tile.
        other: Tile,
    },
}

/// Committed values in row-major order.
fn committed<S: Symbol>(grid: &PossibilityGrid<S>) -> Result<Vec<S>, SolutionError> {
    grid.iter()
        .map(|cell| {
            cell.value()
                .ok_or(SolutionError::Unresolved(cell.x(), cell.y()))
        })
        .collect()
}

/// Local constraint between a cell and its neighbors.
pub trait ConstraintRule: Debug + Send + Sync {
    /// Alphabet the rule works over.
    type Symbol: Symbol;

    /// Rejects grid sizes the rule cannot work on.
    fn validate(&self, width: usize, height: usize) -> Result<(), GridError>;

    /// Neighbors of `(x, y)` in the order they are propagated to.
    fn neighbors(&self, x: usize, y: usize, width: usize, height: usize) -> Vec<(usize, usize)>;

    /// Options `source` removes from each of its unresolved neighbors.
    fn exclusions(&self, source: &Cell<Self::Symbol>) -> Vec<Self::Symbol>;

    /// Checks a finished grid against the whole constraint, not just what
    /// propagation enforced.
    fn verify(&self, grid: &PossibilityGrid<Self::Symbol>) -> Result<(), SolutionError>;
}

/// All-different constraint over rows, columns and boxes of a 9×9 board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SudokuRule {
    /// Which box each cell is paired with.
    pub layout: BlockLayout,
}

impl SudokuRule {
    /// A rule pairing cells with boxes according to `layout`.
    pub fn new(layout: BlockLayout) -> Self {
        Self { layout }
    }
}

impl ConstraintRule for SudokuRule {
    type Symbol = Digit;

    fn validate(&self, width: usize, height: usize) -> Result<(), GridError> {
        if width == SIZE && height == SIZE {
            Ok(())
        } else {
            Err(GridError::UnsupportedDimensions {
                expected_width: SIZE,
                expected_height: SIZE,
                width,
                height,
            })
        }
    }

    fn neighbors(&self, x: usize, y: usize, _width: usize, _height: usize) -> Vec<(usize, usize)> {
        sudoku::peers(self.layout, y, x)
            .into_iter()
            .map(|(row, col)| (col, row))
            .collect()
    }

    fn exclusions(&self, source: &Cell<Digit>) -> Vec<Digit> {
        source.value().into_iter().collect()
    }

    /// Rows, columns and the nine containing boxes, whatever the layout.
    fn verify(&self, grid: &PossibilityGrid<Digit>) -> Result<(), SolutionError> {
        let values = committed(grid)?;
        let mut board = [[0u8; SIZE]; SIZE];
        for (i, digit) in values.into_iter().enumerate().take(SIZE * SIZE) {
            board[i / SIZE][i % SIZE] = digit.get();
        }
        match sudoku::check_solution(&board).first() {
            Some(&unit) => Err(SolutionError::Incomplete(unit)),
            None => Ok(()),
        }
    }
}

/// Orthogonal coastline adjacency for terrain maps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerrainRule {
    /// Which tiles may touch.
    pub table: AdjacencyTable,
}

impl TerrainRule {
    /// A rule backed by `table`.
    pub fn new(table: AdjacencyTable) -> Self {
        Self { table }
    }
}

impl ConstraintRule for TerrainRule {
    type Symbol = Tile;

    fn validate(&self, width: usize, height: usize) -> Result<(), GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroDimension(width, height));
        }
        if width == 1 && height == 1 {
            return Err(GridError::Isolated(0, 0));
        }
        Ok(())
    }

    /// Left, right, up, down, skipping positions off the grid.
    fn neighbors(&self, x: usize, y: usize, width: usize, height: usize) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(4);
        if x > 0 {
            out.push((x - 1, y));
        }
        if x + 1 < width {
            out.push((x + 1, y));
        }
        if y > 0 {
            out.push((x, y - 1));
        }
        if y + 1 < height {
            out.push((x, y + 1));
        }
        out
    }

    fn exclusions(&self, source: &Cell<Tile>) -> Vec<Tile> {
        match source.value() {
            Some(tile) => self.table.struck_by(tile).to_vec(),
            None => {
                let options: Vec<Tile> = source.options().collect();
                self.table.struck_by_options(&options)
            }
        }
    }

    fn verify(&self, grid: &PossibilityGrid<Tile>) -> Result<(), SolutionError> {
        let tiles = committed(grid)?;
        match self.table.clashes(&tiles, grid.width).first() {
            Some(&(at, other_at)) => Err(SolutionError::Adjacency {
                at,
                tile: tiles[at.1 * grid.width + at.0],
                other_at,
                other: tiles[other_at.1 * grid.width + other_at.0],
            }),
            None => Ok(()),
        }
    }
}
