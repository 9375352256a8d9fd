//! Builds the per-step hook from the configured visualization and progress
//! settings.

use crate::config::{Settings, VisualizationMode};
use crate::output::SnapshotWriter;
use crate::progress::{ConsoleProgressReporter, ProgressReporter};
use crate::visualization::{GridRenderer, TerminalVisualizer, Visualizer};
use anyhow::Result;
use std::sync::{Arc, Mutex};
use wfc_core::{PossibilityGrid, ProgressInfo, WfcError};
use wfc_rules::Symbol;

/// Everything that watches a solve step by step.
pub struct StepHook<S: Symbol, R> {
    reporter: Option<ConsoleProgressReporter>,
    terminal: Option<Box<dyn Visualizer<S>>>,
    snapshot: Option<SnapshotWriter<R>>,
}

/// A hook shared between the driver and the runner's progress callback.
pub type SharedHook<S, R> = Arc<Mutex<StepHook<S, R>>>;

impl<S, R> StepHook<S, R>
where
    S: Symbol,
    R: GridRenderer<S> + Clone + 'static,
{
    /// Creates the hook described by `settings`.
    ///
    /// `renderer` draws step frames on the terminal (`steps` mode) and,
    /// uncolored, into the snapshot file.
    pub fn from_settings(settings: &Settings, renderer: R, plain: R) -> Result<Self> {
        let reporter = settings
            .report_interval()?
            .map(ConsoleProgressReporter::new);
        let terminal: Option<Box<dyn Visualizer<S>>> = match settings.visualization {
            VisualizationMode::Steps => Some(Box::new(TerminalVisualizer::new(renderer))),
            VisualizationMode::None | VisualizationMode::Final => None,
        };
        let snapshot = settings
            .snapshot
            .as_deref()
            .map(|path| SnapshotWriter::create(path, plain))
            .transpose()?;
        log::debug!(
            "Step hook: progress reports {}, terminal frames {}, snapshots {}",
            reporter.is_some(),
            terminal.is_some(),
            snapshot.is_some()
        );
        Ok(Self {
            reporter,
            terminal,
            snapshot,
        })
    }

    /// True when anything needs to see individual steps.
    pub fn is_active(&self) -> bool {
        self.reporter.is_some() || self.terminal.is_some() || self.snapshot.is_some()
    }

    /// Records the seeded grid as frame zero of a new attempt.
    pub fn begin_attempt(&mut self, grid: &PossibilityGrid<S>) -> Result<()> {
        if let Some(snapshot) = self.snapshot.as_mut() {
            snapshot.restart();
            snapshot.display_state(grid)?;
        }
        Ok(())
    }

    /// Forwards one step to every enabled observer.
    pub fn on_step(&mut self, info: &ProgressInfo<'_, S>) -> Result<()> {
        if let Some(reporter) = self.reporter.as_mut() {
            reporter.report(info)?;
        }
        if let Some(terminal) = self.terminal.as_mut() {
            terminal.display_state(info.grid)?;
        }
        if let Some(snapshot) = self.snapshot.as_mut() {
            snapshot.display_state(info.grid)?;
        }
        Ok(())
    }

    /// Reports the outcome and flushes the snapshot file.
    pub fn finish(&mut self, outcome: Result<(), &WfcError>) -> Result<()> {
        if let Some(reporter) = self.reporter.as_mut() {
            match outcome {
                Ok(()) => reporter.finish()?,
                Err(err) => reporter.fail(err)?,
            }
        }
        if let Some(snapshot) = self.snapshot.take() {
            snapshot.finish()?;
        }
        Ok(())
    }
}

/// Wraps a shared hook as a runner progress callback.
pub fn progress_callback<S, R>(
    hook: SharedHook<S, R>,
) -> impl FnMut(&ProgressInfo<'_, S>) -> Result<(), WfcError> + Send + 'static
where
    S: Symbol,
    R: GridRenderer<S> + Clone + 'static,
{
    move |info| {
        let mut hook = hook
            .lock()
            .map_err(|_| WfcError::Callback("step hook lock poisoned".into()))?;
        hook.on_step(info)
            .map_err(|e| WfcError::Callback(format!("{e:#}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualization::TerrainRenderer;
    use wfc_core::{Runner, WfcConfig};
    use wfc_rules::Tile;

    #[test]
    fn test_default_settings_need_no_hook() {
        let hook = StepHook::<Tile, _>::from_settings(
            &Settings::default(),
            TerrainRenderer::colored(),
            TerrainRenderer::plain(),
        )
        .unwrap();
        assert!(!hook.is_active());
    }

    #[test]
    fn test_snapshot_holds_one_frame_per_step() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug");
        let settings = Settings {
            snapshot: Some(path.clone()),
            ..Settings::default()
        };
        let hook = StepHook::from_settings(
            &settings,
            TerrainRenderer::colored(),
            TerrainRenderer::plain(),
        )
        .unwrap();
        let hook: SharedHook<Tile, TerrainRenderer> = Arc::new(Mutex::new(hook));

        let config = WfcConfig::builder()
            .seed(5)
            .progress_callback(progress_callback(Arc::clone(&hook)))
            .build();
        let mut runner = Runner::terrain(4, 3, config).unwrap();
        hook.lock().unwrap().begin_attempt(runner.grid()).unwrap();
        let summary = runner.run().unwrap();
        hook.lock().unwrap().finish(Ok(())).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let frame_headers = text
            .lines()
            .filter(|line| line.trim().parse::<u64>().is_ok())
            .count();
        assert_eq!(frame_headers as u64, summary.iterations + 1);
        assert!(text.starts_with("0\nf f f f \n"));
    }
}
