//! Drivers for the single, multi and Sudoku modes.

use crate::{
    config::{Settings, VisualizationMode},
    error::AppError,
    setup::visualization::{progress_callback, SharedHook, StepHook},
    visualization::{render_side_by_side, GridRenderer, SudokuRenderer, TerrainRenderer},
};
use anyhow::{Context, Result};
use log::{info, warn};
use rayon::prelude::*;
use std::{
    io::Write,
    path::Path,
    sync::{atomic::AtomicBool, Arc, Mutex, MutexGuard},
};
use wfc_core::{
    run_with_retry, ConstraintRule, EdgeBiasedEntropy, EntropyCalculator, PossibilityGrid, Runner,
    SudokuRule, TerrainRule, WfcConfig, WfcConfigBuilder, WfcError,
};
use wfc_rules::{sudoku::SIZE, Digit, Symbol, Tile};

/// Sudoku givens indexed `[row][col]`, `0` for blanks.
pub type Givens = [[u8; SIZE]; SIZE];

fn config_builder<S: Symbol>(
    settings: &Settings,
    shutdown: &Arc<AtomicBool>,
    seed: Option<u64>,
) -> WfcConfigBuilder<S> {
    let builder = WfcConfig::builder()
        .selection_strategy(settings.selection)
        .shutdown_signal(Arc::clone(shutdown))
        .maybe_seed(seed);
    match settings.max_iterations {
        Some(max) => builder.max_iterations(max),
        None => builder,
    }
}

fn lock<S: Symbol, R>(hook: &SharedHook<S, R>) -> Result<MutexGuard<'_, StepHook<S, R>>, WfcError> {
    hook.lock()
        .map_err(|_| WfcError::Callback("step hook lock poisoned".into()))
}

fn terrain_runner(
    settings: &Settings,
    builder: WfcConfigBuilder<Tile>,
) -> Result<Runner<TerrainRule, EdgeBiasedEntropy>, WfcError> {
    let mut runner = Runner::terrain(settings.width, settings.height, builder.build())?;
    if settings.frame {
        runner.seed_frame(settings.border, settings.center)?;
    }
    Ok(runner)
}

/// Rejects a solved grid that breaks its rule.
fn verified<R, E>(runner: &Runner<R, E>) -> Result<(), WfcError>
where
    R: ConstraintRule,
    E: EntropyCalculator,
{
    runner.verify().map_err(|err| {
        warn!("Solved grid failed verification: {err}");
        err
    })
}

/// Runs `build` under the retry loop with the step hook attached to every
/// attempt.
fn solve_hooked<R, E, Rd, F>(
    settings: &Settings,
    shutdown: &Arc<AtomicBool>,
    hook: StepHook<R::Symbol, Rd>,
    mut build: F,
) -> Result<PossibilityGrid<R::Symbol>>
where
    R: ConstraintRule,
    E: EntropyCalculator,
    Rd: GridRenderer<R::Symbol> + Clone + 'static,
    F: FnMut(WfcConfigBuilder<R::Symbol>) -> Result<Runner<R, E>, WfcError>,
{
    let active = hook.is_active();
    let hook: SharedHook<R::Symbol, Rd> = Arc::new(Mutex::new(hook));

    let result = run_with_retry(settings.attempts, settings.seed, |seed| {
        let mut builder = config_builder(settings, shutdown, seed);
        if active {
            builder = builder.progress_callback(progress_callback(Arc::clone(&hook)));
        }
        let runner = build(builder)?;
        if active {
            lock(&hook)?
                .begin_attempt(runner.grid())
                .map_err(|e| WfcError::Callback(format!("{e:#}")))?;
        }
        Ok(runner)
    });

    lock(&hook)?.finish(result.as_ref().map(|_| ()))?;
    let (runner, summary) = result?;
    verified(&runner)?;
    info!(
        "Solved {}x{} grid in {} iterations ({}).",
        runner.grid().width,
        runner.grid().height,
        summary.iterations,
        humantime::format_duration(summary.elapsed)
    );
    Ok(runner.into_grid())
}

/// Generates one terrain map.
pub fn run_single(settings: &Settings, shutdown: &Arc<AtomicBool>) -> Result<PossibilityGrid<Tile>> {
    info!(
        "Generating {}x{} terrain map (frame: {}).",
        settings.width, settings.height, settings.frame
    );
    let hook = StepHook::from_settings(settings, TerrainRenderer::colored(), TerrainRenderer::plain())?;
    solve_hooked(settings, shutdown, hook, |builder| {
        terrain_runner(settings, builder)
    })
}

/// Generates `batches` rows of `batch_size` maps, each batch in parallel.
///
/// Map `n` (counting across batches) starts from seed `seed + n * attempts`
/// so no two maps share an attempt seed.
pub fn run_multi(
    settings: &Settings,
    shutdown: &Arc<AtomicBool>,
) -> Result<Vec<Vec<PossibilityGrid<Tile>>>> {
    info!(
        "Generating {} batches of {} maps ({}x{}).",
        settings.batches, settings.batch_size, settings.width, settings.height
    );
    let batches = (0..settings.batches)
        .map(|batch| {
            (0..settings.batch_size)
                .into_par_iter()
                .map(|slot| {
                    let index = (batch * settings.batch_size + slot) as u64;
                    let base = settings
                        .seed
                        .map(|seed| seed.wrapping_add(index.wrapping_mul(settings.attempts as u64)));
                    let (runner, _) = run_with_retry(settings.attempts, base, |seed| {
                        terrain_runner(settings, config_builder(settings, shutdown, seed))
                    })?;
                    verified(&runner)?;
                    Ok(runner.into_grid())
                })
                .collect::<Result<Vec<_>, WfcError>>()
        })
        .collect::<Result<Vec<_>, WfcError>>()?;
    Ok(batches)
}

/// Solves a Sudoku, starting from the givens file if one is configured.
pub fn run_sudoku(settings: &Settings, shutdown: &Arc<AtomicBool>) -> Result<PossibilityGrid<Digit>> {
    let givens = settings.givens.as_deref().map(load_givens).transpose()?;
    info!(
        "Solving Sudoku ({:?} layout, {} givens).",
        settings.layout,
        givens
            .iter()
            .flatten()
            .flatten()
            .filter(|&&d| d != 0)
            .count()
    );
    let renderer = SudokuRenderer {
        display: settings.sudoku_display,
    };
    let hook = StepHook::from_settings(settings, renderer, renderer)?;
    solve_hooked(settings, shutdown, hook, |builder| {
        let mut runner: Runner<SudokuRule, _> = Runner::sudoku(settings.layout, builder.build())?;
        if let Some(givens) = &givens {
            runner.seed_givens(givens)?;
        }
        Ok(runner)
    })
}

/// Parses nine lines of nine cells. Digits are givens, `0` and `.` are
/// blanks; whitespace inside a line and blank lines are ignored.
pub fn parse_givens(text: &str) -> Result<Givens, AppError> {
    let rows: Vec<Vec<u8>> = text
        .lines()
        .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .enumerate()
        .map(|(row, cells)| {
            cells
                .into_iter()
                .map(|c| match c {
                    '.' => Ok(0),
                    d => d.to_digit(10).map(|d| d as u8).ok_or_else(|| {
                        AppError::Config(format!("row {}: '{c}' is not a digit or '.'", row + 1))
                    }),
                })
                .collect()
        })
        .collect::<Result<_, _>>()?;

    if rows.len() != SIZE || rows.iter().any(|row| row.len() != SIZE) {
        return Err(AppError::Config(format!(
            "givens must be {SIZE} rows of {SIZE} cells"
        )));
    }
    let mut givens = [[0; SIZE]; SIZE];
    for (target, row) in givens.iter_mut().zip(rows) {
        target.copy_from_slice(&row);
    }
    Ok(givens)
}

fn load_givens(path: &Path) -> Result<Givens> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read givens file: {:?}", path))?;
    parse_givens(&text).with_context(|| format!("Invalid givens file: {:?}", path))
}

/// Runs the configured mode and prints the result to `out`.
pub fn execute(settings: &Settings, shutdown: &Arc<AtomicBool>, out: &mut impl Write) -> Result<()> {
    use crate::config::Mode;

    let show = settings.visualization != VisualizationMode::None;
    match settings.mode {
        Mode::Single => {
            let grid = run_single(settings, shutdown)?;
            if show {
                write!(out, "{}", TerrainRenderer::colored().render(&grid))?;
            }
        }
        Mode::Multi => {
            let batches = run_multi(settings, shutdown)?;
            if show {
                for batch in &batches {
                    writeln!(out, "{}", render_side_by_side(&TerrainRenderer::colored(), batch))?;
                }
            }
        }
        Mode::Sudoku => {
            let grid = run_sudoku(settings, shutdown)?;
            if show {
                let renderer = SudokuRenderer {
                    display: settings.sudoku_display,
                };
                write!(out, "{}", renderer.render(&grid))?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUZZLE: &str = "\
53..7....
6..195...
.98....6.
8...6...3
4..8.3..1
7...2...6
.6....28.
...419..5
....8..79
";

    #[test]
    fn test_parse_givens() {
        let givens = parse_givens(PUZZLE).unwrap();
        assert_eq!(givens[0], [5, 3, 0, 0, 7, 0, 0, 0, 0]);
        assert_eq!(givens[8][8], 9);
    }

    #[test]
    fn test_parse_givens_rejects_bad_shapes() {
        assert!(parse_givens("123").is_err());
        assert!(parse_givens(&PUZZLE.replace('7', "x")).is_err());
    }

    #[test]
    fn test_puzzle_is_completed_around_its_givens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("puzzle.txt");
        std::fs::write(&path, PUZZLE).unwrap();
        let settings = Settings {
            givens: Some(path),
            seed: Some(1),
            ..Settings::default()
        };
        let shutdown = Arc::new(AtomicBool::new(false));
        let grid = run_sudoku(&settings, &shutdown).unwrap();
        assert!(grid.is_fully_resolved());
        assert_eq!(grid.get(0, 0).and_then(|c| c.value()).map(Digit::get), Some(5));
        assert_eq!(grid.get(4, 7).and_then(|c| c.value()).map(Digit::get), Some(1));
    }

    #[test]
    fn test_multi_shapes_and_seeds() {
        let settings = Settings {
            width: 8,
            height: 8,
            batches: 2,
            batch_size: 3,
            seed: Some(4),
            ..Settings::default()
        };
        let shutdown = Arc::new(AtomicBool::new(false));
        let first = run_multi(&settings, &shutdown).unwrap();
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|batch| batch.len() == 3));
        assert_eq!(first, run_multi(&settings, &shutdown).unwrap());
    }

    #[test]
    fn test_residue_layout_is_rejected_after_solving() {
        let settings = Settings {
            layout: wfc_rules::BlockLayout::Residue,
            seed: Some(1),
            ..Settings::default()
        };
        let shutdown = Arc::new(AtomicBool::new(false));
        let err = run_sudoku(&settings, &shutdown).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WfcError>(),
            Some(WfcError::InvalidSolution(wfc_core::SolutionError::Incomplete(_)))
        ));
    }

    #[test]
    fn test_single_map_passes_verification() {
        let settings = Settings {
            width: 10,
            height: 7,
            seed: Some(9),
            ..Settings::default()
        };
        let shutdown = Arc::new(AtomicBool::new(false));
        let grid = run_single(&settings, &shutdown).unwrap();
        assert!(TerrainRule::default().verify(&grid).is_ok());
    }

    #[test]
    fn test_small_frame_gives_up() {
        let settings = Settings {
            width: 5,
            height: 5,
            attempts: 3,
            ..Settings::default()
        };
        let shutdown = Arc::new(AtomicBool::new(false));
        let err = run_single(&settings, &shutdown).unwrap_err();
        assert_eq!(
            err.downcast_ref::<WfcError>(),
            Some(&WfcError::RetriesExhausted(3))
        );
    }
}
