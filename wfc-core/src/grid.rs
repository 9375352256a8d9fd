use crate::cell::Cell;
use thiserror::Error;
use wfc_rules::Symbol;

/// Errors related to grid geometry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Width or height was zero.
    #[error("Grid dimensions must be non-zero, got {0}x{1}")]
    ZeroDimension(usize, usize),
    /// A coordinate fell outside `[0,w)×[0,h)`.
    #[error("Coordinate ({0}, {1}) is outside the grid")]
    OutOfBounds(usize, usize),
    /// A cell would have no neighbors to propagate to.
    #[error("Cell ({0}, {1}) has no neighbors")]
    Isolated(usize, usize),
    /// The rule only supports one fixed size.
    #[error("Expected a {expected_width}x{expected_height} grid, got {width}x{height}")]
    UnsupportedDimensions {
        /// Width the rule requires.
        expected_width: usize,
        /// Height the rule requires.
        expected_height: usize,
        /// Width that was requested.
        width: usize,
        /// Height that was requested.
        height: usize,
    },
}

/// Dense row-major 2D storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    pub(crate) data: Vec<T>,
}

impl<T> Grid<T> {
    /// Builds a grid by calling `init(x, y)` for every coordinate.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut init: impl FnMut(usize, usize) -> T,
    ) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroDimension(width, height));
        }
        let data = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| init(x, y))
            .collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Returns an immutable reference to the element at the given coordinates,
    /// or None if the coordinates are out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        self.index(x, y).and_then(|idx| self.data.get(idx))
    }

    /// Returns a mutable reference to the element at the given coordinates,
    /// or None if the coordinates are out of bounds.
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        self.index(x, y).and_then(move |idx| self.data.get_mut(idx))
    }

    /// Iterates over all elements in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// All coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = (usize, usize)> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| (x, y)))
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the grid holds no elements. Never the case for a grid
    /// built through [`Grid::from_fn`].
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }
}

/// Grid of cells, each holding its remaining options.
pub type PossibilityGrid<S> = Grid<Cell<S>>;

impl<S: Symbol> Grid<Cell<S>> {
    /// Creates a grid where every cell holds the full alphabet.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        Self::from_fn(width, height, Cell::new)
    }

    /// True once every cell holds a committed value.
    pub fn is_fully_resolved(&self) -> bool {
        self.data.iter().all(Cell::is_resolved)
    }

    /// Number of cells holding a committed value.
    pub fn resolved_count(&self) -> usize {
        self.data.iter().filter(|cell| cell.is_resolved()).count()
    }

    /// Cells that still hold options.
    pub fn unresolved(&self) -> impl Iterator<Item = &Cell<S>> {
        self.data.iter().filter(|cell| !cell.is_resolved())
    }
}
