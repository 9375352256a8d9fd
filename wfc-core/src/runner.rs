use crate::{
    entropy::{EdgeBiasedEntropy, EntropyCalculator, OptionCountEntropy, SelectionStrategy},
    grid::{GridError, PossibilityGrid},
    propagator::{ConstraintPropagator, DepthFirstPropagator, PropagationReport},
    rules::{ConstraintRule, SudokuRule, TerrainRule},
    ProgressInfo, WfcError,
};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wfc_rules::sudoku::SIZE;
use wfc_rules::{BlockLayout, Digit, Symbol, Tile};

/// Alias for the progress callback function type.
pub type ProgressCallback<S> =
    Box<dyn FnMut(&ProgressInfo<'_, S>) -> Result<(), WfcError> + Send>;

/// Configuration options for the runner.
pub struct WfcConfig<S: Symbol> {
    /// How ties between lowest-entropy cells are broken.
    pub selection_strategy: SelectionStrategy,
    /// Called after every step.
    pub progress_callback: Option<ProgressCallback<S>>,
    /// Raised externally to stop the run between steps.
    pub shutdown_signal: Arc<AtomicBool>,
    /// Step cap, unlimited when `None`.
    pub max_iterations: Option<u64>,
    /// RNG seed, OS entropy when `None`.
    pub seed: Option<u64>,
}

impl<S: Symbol> WfcConfig<S> {
    /// Creates a new builder for `WfcConfig`.
    pub fn builder() -> WfcConfigBuilder<S> {
        WfcConfigBuilder::default()
    }
}

impl<S: Symbol> Default for WfcConfig<S> {
    fn default() -> Self {
        Self {
            selection_strategy: SelectionStrategy::default(),
            progress_callback: None,
            shutdown_signal: Arc::new(AtomicBool::new(false)),
            max_iterations: None,
            seed: None,
        }
    }
}

impl<S: Symbol> std::fmt::Debug for WfcConfig<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WfcConfig")
            .field("selection_strategy", &self.selection_strategy)
            .field("progress_callback", &self.progress_callback.is_some())
            .field("shutdown_signal", &self.shutdown_signal)
            .field("max_iterations", &self.max_iterations)
            .field("seed", &self.seed)
            .finish()
    }
}

/// Builder for `WfcConfig`.
pub struct WfcConfigBuilder<S: Symbol> {
    selection_strategy: SelectionStrategy,
    progress_callback: Option<ProgressCallback<S>>,
    shutdown_signal: Option<Arc<AtomicBool>>,
    max_iterations: Option<u64>,
    seed: Option<u64>,
}

impl<S: Symbol> Default for WfcConfigBuilder<S> {
    fn default() -> Self {
        Self {
            selection_strategy: SelectionStrategy::default(),
            progress_callback: None,
            shutdown_signal: None,
            max_iterations: None,
            seed: None,
        }
    }
}

impl<S: Symbol> WfcConfigBuilder<S> {
    /// Sets how ties at minimal entropy are broken.
    pub fn selection_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.selection_strategy = strategy;
        self
    }

    /// Sets the progress callback function.
    pub fn progress_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&ProgressInfo<'_, S>) -> Result<(), WfcError> + Send + 'static,
    {
        self.progress_callback = Some(Box::new(callback));
        self
    }

    /// Provides an external shutdown signal.
    /// If not provided, a new signal will be created.
    pub fn shutdown_signal(mut self, signal: Arc<AtomicBool>) -> Self {
        self.shutdown_signal = Some(signal);
        self
    }

    /// Sets the maximum number of steps allowed.
    pub fn max_iterations(mut self, max: u64) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Sets the seed for the random number generator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Like [`WfcConfigBuilder::seed`], leaving the generator unseeded on `None`.
    pub fn maybe_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Builds the `WfcConfig` instance.
    pub fn build(self) -> WfcConfig<S> {
        WfcConfig {
            selection_strategy: self.selection_strategy,
            progress_callback: self.progress_callback,
            shutdown_signal: self
                .shutdown_signal
                .unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
            max_iterations: self.max_iterations,
            seed: self.seed,
        }
    }
}

/// Result of a single [`Runner::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome<S> {
    /// One cell was collapsed and its consequences propagated.
    Collapsed {
        x: usize,
        y: usize,
        value: S,
        report: PropagationReport,
    },
    /// Nothing left to collapse.
    Solved,
}

/// Statistics of a finished solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Steps taken, the final `Solved` check excluded.
    pub iterations: u64,
    /// Wall time since the runner was created.
    pub elapsed: Duration,
}

/// Drives a grid from the full alphabet to a complete assignment.
///
/// Each step:
/// 1. **Observation**: selects an unresolved cell of lowest entropy.
/// 2. **Collapse**: commits it to one of its options, uniformly at random.
/// 3. **Propagation**: cascades the consequences through the `ConstraintPropagator`.
/// 4. **Sweep**: commits and propagates any cell left with a single option.
///
/// A contradiction aborts the solve; there is no backtracking. The grid is
/// owned, so independent runners can be moved to separate threads.
#[derive(Debug)]
pub struct Runner<R, E, P = DepthFirstPropagator>
where
    R: ConstraintRule,
{
    grid: PossibilityGrid<R::Symbol>,
    rule: R,
    entropy: E,
    propagator: P,
    rng: StdRng,
    config: WfcConfig<R::Symbol>,
    iterations: u64,
    started: Instant,
}

impl<R, E, P> Runner<R, E, P>
where
    R: ConstraintRule,
    E: EntropyCalculator,
    P: ConstraintPropagator,
{
    /// Creates a runner over a fresh `width`×`height` grid.
    pub fn new(
        width: usize,
        height: usize,
        rule: R,
        entropy: E,
        propagator: P,
        config: WfcConfig<R::Symbol>,
    ) -> Result<Self, WfcError> {
        rule.validate(width, height)?;
        let grid = PossibilityGrid::new(width, height)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            grid,
            rule,
            entropy,
            propagator,
            rng,
            config,
            iterations: 0,
            started: Instant::now(),
        })
    }

    /// The current grid state.
    pub fn grid(&self) -> &PossibilityGrid<R::Symbol> {
        &self.grid
    }

    /// Consumes the runner, returning its grid.
    pub fn into_grid(self) -> PossibilityGrid<R::Symbol> {
        self.grid
    }

    /// The constraint rule in use.
    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// Checks the grid against the full rule once solving is done.
    pub fn verify(&self) -> Result<(), WfcError> {
        self.rule.verify(&self.grid).map_err(WfcError::from)
    }

    /// Steps taken so far.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Forces `(x, y)` to `value` and propagates immediately.
    pub fn seed_cell(
        &mut self,
        x: usize,
        y: usize,
        value: R::Symbol,
    ) -> Result<PropagationReport, WfcError> {
        let cell = self
            .grid
            .get_mut(x, y)
            .ok_or(GridError::OutOfBounds(x, y))?;
        cell.commit(value)?;
        debug!("Seeded ({x}, {y}) with {value:?}");
        Ok(self.propagator.propagate(&mut self.grid, (x, y), &self.rule)?)
    }

    /// Selects, collapses and propagates one cell.
    pub fn step(&mut self) -> Result<StepOutcome<R::Symbol>, WfcError> {
        if self.config.shutdown_signal.load(Ordering::Relaxed) {
            warn!("Shutdown signal received, stopping run prematurely.");
            return Err(WfcError::Interrupted);
        }
        if self.grid.is_fully_resolved() {
            return Ok(StepOutcome::Solved);
        }

        self.iterations += 1;
        if let Some(max) = self.config.max_iterations {
            if self.iterations > max {
                warn!("Maximum iterations ({max}) exceeded.");
                return Err(WfcError::MaxIterationsReached(max));
            }
        }

        let (x, y) = self.entropy.select_lowest_entropy_cell(
            &self.grid,
            self.config.selection_strategy,
            &mut self.rng,
        )?;
        let cell = self
            .grid
            .get_mut(x, y)
            .ok_or(GridError::OutOfBounds(x, y))?;
        let value = cell.collapse(&mut self.rng)?;
        debug!("Iter {}: collapsed ({x}, {y}) to {value:?}", self.iterations);

        let mut report = self.propagator.propagate(&mut self.grid, (x, y), &self.rule)?;
        report += self.sweep_singletons()?;
        self.notify_progress()?;

        Ok(StepOutcome::Collapsed {
            x,
            y,
            value,
            report,
        })
    }

    /// Steps until every cell is resolved.
    pub fn run(&mut self) -> Result<RunSummary, WfcError> {
        info!(
            "Starting run on {}x{} grid ({} cells resolved).",
            self.grid.width,
            self.grid.height,
            self.grid.resolved_count()
        );
        loop {
            match self.step() {
                Ok(StepOutcome::Solved) => break,
                Ok(StepOutcome::Collapsed { .. }) => {}
                Err(err) => {
                    warn!("Run aborted after {} iterations: {err}", self.iterations);
                    return Err(err);
                }
            }
        }
        let summary = RunSummary {
            iterations: self.iterations,
            elapsed: self.started.elapsed(),
        };
        info!(
            "Run finished in {:?} after {} iterations.",
            summary.elapsed, summary.iterations
        );
        Ok(summary)
    }

    /// Commits and propagates every unresolved singleton, row-major.
    fn sweep_singletons(&mut self) -> Result<PropagationReport, WfcError> {
        let mut report = PropagationReport::default();
        let coords: Vec<(usize, usize)> = self.grid.coords().collect();
        for (x, y) in coords {
            let singleton = self
                .grid
                .get(x, y)
                .is_some_and(|cell| !cell.is_resolved() && cell.option_count() == 1);
            if singleton {
                report += self.propagator.propagate(&mut self.grid, (x, y), &self.rule)?;
            }
        }
        Ok(report)
    }

    fn notify_progress(&mut self) -> Result<(), WfcError> {
        if let Some(callback) = self.config.progress_callback.as_mut() {
            let info = ProgressInfo {
                resolved_cells: self.grid.resolved_count(),
                total_cells: self.grid.len(),
                iterations: self.iterations,
                elapsed_time: self.started.elapsed(),
                grid: &self.grid,
            };
            callback(&info)?;
        }
        Ok(())
    }
}

impl Runner<SudokuRule, OptionCountEntropy> {
    /// A 9×9 Sudoku solver with option-count entropy.
    pub fn sudoku(layout: BlockLayout, config: WfcConfig<Digit>) -> Result<Self, WfcError> {
        Self::new(
            SIZE,
            SIZE,
            SudokuRule::new(layout),
            OptionCountEntropy,
            DepthFirstPropagator::new(),
            config,
        )
    }

    /// Seeds every non-zero entry of `givens`, indexed `[row][col]`.
    pub fn seed_givens(&mut self, givens: &[[u8; SIZE]; SIZE]) -> Result<(), WfcError> {
        for (y, row) in givens.iter().enumerate() {
            for (x, &raw) in row.iter().enumerate() {
                if raw == 0 {
                    continue;
                }
                let digit = Digit::new(raw).map_err(|e| WfcError::Precondition(e.to_string()))?;
                self.seed_cell(x, y, digit)?;
            }
        }
        Ok(())
    }
}

impl Runner<TerrainRule, EdgeBiasedEntropy> {
    /// A terrain generator with edge-biased entropy.
    pub fn terrain(width: usize, height: usize, config: WfcConfig<Tile>) -> Result<Self, WfcError> {
        Self::new(
            width,
            height,
            TerrainRule::default(),
            EdgeBiasedEntropy,
            DepthFirstPropagator::new(),
            config,
        )
    }

    /// Forces the outer ring to `border` and the middle cell to `center`.
    ///
    /// Top and bottom rows are seeded first, then the left and right
    /// columns, then `(width / 2, height / 2)`.
    pub fn seed_frame(&mut self, border: Tile, center: Tile) -> Result<(), WfcError> {
        let (width, height) = (self.grid.width, self.grid.height);
        for x in 0..width {
            self.seed_cell(x, 0, border)?;
            self.seed_cell(x, height - 1, border)?;
        }
        for y in 0..height {
            self.seed_cell(0, y, border)?;
            self.seed_cell(width - 1, y, border)?;
        }
        self.seed_cell(width / 2, height / 2, center)?;
        Ok(())
    }
}
