//! Core library for the grid constraint-propagation solver.
//! Defines the cell and grid data model, the rule, entropy and propagation
//! seams, and the driver that ties them together.

use std::time::Duration;
use thiserror::Error;
use wfc_rules::Symbol;

/// A single grid position and its remaining options.
pub mod cell;
/// Entropy calculation logic and traits.
pub mod entropy;
/// Generic 2D grid structures and the possibility grid.
pub mod grid;
/// Constraint propagation logic and traits.
pub mod propagator;
/// Retrying a solve after a contradiction.
pub mod retry;
/// Per-domain neighbor and exclusion logic.
pub mod rules;
/// The core solve driver.
pub mod runner;

pub use crate::cell::{Cell, CellError};
pub use crate::entropy::{
    EdgeBiasedEntropy, Entropy, EntropyCalculator, EntropyError, OptionCountEntropy,
    SelectionStrategy,
};
pub use crate::grid::{Grid, GridError, PossibilityGrid};
pub use crate::propagator::{
    ConstraintPropagator, DepthFirstPropagator, PropagationError, PropagationReport,
};
pub use crate::retry::run_with_retry;
pub use crate::rules::{ConstraintRule, SolutionError, SudokuRule, TerrainRule};
pub use crate::runner::{RunSummary, Runner, StepOutcome, WfcConfig, WfcConfigBuilder};

/// Errors that can occur while driving a solve.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WfcError {
    /// A cell ran out of options. Includes the (x, y) coordinates of the
    /// contradictory cell.
    #[error("Contradiction found at ({0}, {1})")]
    Contradiction(usize, usize),
    /// Propagation failed for a reason other than a contradiction.
    #[error("Propagation error: {0}")]
    Propagation(PropagationError),
    /// Invalid grid dimensions or coordinates.
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),
    /// Cell selection failed.
    #[error("Entropy selection error: {0}")]
    Entropy(#[from] EntropyError),
    /// An operation was used out of order, e.g. collapsing a resolved cell.
    #[error("Precondition violated: {0}")]
    Precondition(String),
    /// The configured iteration cap was hit.
    #[error("Maximum iterations ({0}) reached")]
    MaxIterationsReached(u64),
    /// The external shutdown signal was raised.
    #[error("Run interrupted by shutdown signal")]
    Interrupted,
    /// The progress callback asked to stop.
    #[error("Progress callback failed: {0}")]
    Callback(String),
    /// A finished grid breaks its rule.
    #[error("Invalid solution: {0}")]
    InvalidSolution(#[from] SolutionError),
    /// Every retry attempt ended in a contradiction.
    #[error("Gave up after {0} attempts")]
    RetriesExhausted(usize),
}

impl WfcError {
    /// True for errors a fresh attempt might avoid.
    pub fn is_contradiction(&self) -> bool {
        matches!(self, Self::Contradiction(..))
    }
}

impl From<PropagationError> for WfcError {
    fn from(err: PropagationError) -> Self {
        match err {
            PropagationError::Contradiction(x, y) => Self::Contradiction(x, y),
            other => Self::Propagation(other),
        }
    }
}

impl From<CellError> for WfcError {
    fn from(err: CellError) -> Self {
        match err {
            CellError::Contradiction(x, y) => Self::Contradiction(x, y),
            CellError::AlreadyResolved(..) => Self::Precondition(err.to_string()),
        }
    }
}

/// Snapshot handed to the progress callback after every step.
#[derive(Debug, Clone, Copy)]
pub struct ProgressInfo<'a, S: Symbol> {
    /// Cells holding a committed value.
    pub resolved_cells: usize,
    /// The total number of cells in the grid.
    pub total_cells: usize,
    /// The number of steps completed so far.
    pub iterations: u64,
    /// Time elapsed since the runner was created.
    pub elapsed_time: Duration,
    /// The grid as it stands after the step.
    pub grid: &'a PossibilityGrid<S>,
}

impl<S: Symbol> ProgressInfo<'_, S> {
    /// Resolved share in percent.
    pub fn percent(&self) -> f64 {
        if self.total_cells == 0 {
            return 100.0;
        }
        self.resolved_cells as f64 * 100.0 / self.total_cells as f64
    }
}
