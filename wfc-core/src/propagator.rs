//! Constraint propagation logic and traits.

use crate::cell::CellError;
use crate::grid::PossibilityGrid;
use crate::rules::ConstraintRule;
use std::fmt::Debug;
use std::ops::AddAssign;
use thiserror::Error;

/// Stack-driven depth-first propagation.
pub mod depth_first;

pub use depth_first::DepthFirstPropagator;

/// Errors that can occur during the constraint propagation phase.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropagationError {
    /// A cell's option set would have become empty.
    /// Contains the (x, y) coordinates of the contradictory cell.
    #[error("Contradiction detected during propagation at ({0}, {1})")]
    Contradiction(usize, usize),
    /// Propagation was started from, or reached, a position off the grid.
    #[error("Coordinate ({0}, {1}) is outside the grid")]
    InvalidCoordinate(usize, usize),
    /// Options were struck from a cell that already holds a value.
    #[error("Cell ({0}, {1}) is already resolved")]
    AlreadyResolved(usize, usize),
}

impl From<CellError> for PropagationError {
    fn from(err: CellError) -> Self {
        match err {
            CellError::Contradiction(x, y) => Self::Contradiction(x, y),
            CellError::AlreadyResolved(x, y) => Self::AlreadyResolved(x, y),
        }
    }
}

/// What a single propagation pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationReport {
    /// Options struck across all touched cells.
    pub removed: usize,
    /// Cells committed because they were left with one option.
    pub auto_resolved: usize,
    /// Cells propagation was started from, the origin included.
    pub visited: usize,
}

impl AddAssign for PropagationReport {
    fn add_assign(&mut self, rhs: Self) {
        self.removed += rhs.removed;
        self.auto_resolved += rhs.auto_resolved;
        self.visited += rhs.visited;
    }
}

/// Cascades the consequences of a change at one cell through the grid.
///
/// Implementors update the `grid` in place using the `rule`, starting from
/// `origin`, until no further option can be removed.
pub trait ConstraintPropagator: Debug + Send + Sync {
    /// Propagates constraints outward from `origin`.
    ///
    /// # Returns
    ///
    /// * `Ok(PropagationReport)` once the fixpoint is reached.
    /// * `Err(PropagationError::Contradiction)` if a removal would empty a cell.
    ///   The grid is left in the partially propagated state.
    fn propagate<R: ConstraintRule>(
        &mut self,
        grid: &mut PossibilityGrid<R::Symbol>,
        origin: (usize, usize),
        rule: &R,
    ) -> Result<PropagationReport, PropagationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_errors_keep_their_kind() {
        assert_eq!(
            PropagationError::from(CellError::Contradiction(1, 2)),
            PropagationError::Contradiction(1, 2)
        );
        assert_eq!(
            PropagationError::from(CellError::AlreadyResolved(3, 4)),
            PropagationError::AlreadyResolved(3, 4)
        );
        assert!(!crate::WfcError::from(PropagationError::AlreadyResolved(3, 4)).is_contradiction());
    }
}
