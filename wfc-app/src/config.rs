//! Command line arguments and layered settings.
//!
//! Settings are resolved from, lowest precedence first: built-in defaults,
//! an optional TOML file (`--config`), `WFC_`-prefixed environment variables,
//! and finally the flags given on the command line.

use crate::error::AppError;
use clap::{Parser, ValueEnum};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use wfc_core::SelectionStrategy;
use wfc_rules::{BlockLayout, Tile};

/// What to generate.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// One terrain map.
    #[default]
    Single,
    /// Several batches of terrain maps printed side by side.
    Multi,
    /// A 9×9 Sudoku.
    Sudoku,
}

/// Represents the different visualization modes available.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualizationMode {
    /// Print nothing but logs.
    None,
    /// Print the finished grid.
    #[default]
    Final,
    /// Print the grid after every step.
    Steps,
}

/// How unsolved and solved Sudoku cells are printed.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SudokuDisplay {
    /// Digits, `?` while unresolved.
    #[default]
    Values,
    /// `*` once resolved, the option count before.
    Counts,
}

/// Log level for progress reports.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressLogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
}

/// Log level for everything else.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GlobalLogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Command line interface of the `wfc` binary.
///
/// Every setting is optional here; unset flags fall through to the
/// environment, the config file, or the defaults in [`Settings`].
#[derive(Parser, Debug, Clone, Default, Serialize)]
#[command(author, version, about = "Grid constraint solver: terrain maps and Sudoku", long_about = None)]
pub struct AppConfig {
    /// TOML file with settings.
    #[arg(short, long, value_name = "FILE")]
    #[serde(skip)]
    pub config: Option<PathBuf>,

    #[arg(short, long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,

    /// Width of terrain maps.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<usize>,

    /// Height of terrain maps.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<usize>,

    /// Optional seed for the random number generator.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Solve attempts before giving up on contradictions.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<usize>,

    /// Seed the border and centre before solving.
    #[arg(long, value_name = "BOOL")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<bool>,

    /// Tile forced along the border.
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Tile>,

    /// Tile forced at the centre.
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<Tile>,

    /// Number of batches in multi mode.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batches: Option<usize>,

    /// Maps per batch in multi mode.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,

    /// Abort a solve after this many steps.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<u64>,

    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionStrategy>,

    /// Box pairing used by the Sudoku rule.
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<BlockLayout>,

    /// Sudoku givens: nine lines of nine digits, `0` or `.` for blanks.
    #[arg(long, value_name = "FILE")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub givens: Option<PathBuf>,

    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualization: Option<VisualizationMode>,

    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sudoku_display: Option<SudokuDisplay>,

    /// Write every intermediate grid, numbered, to this file.
    #[arg(long, value_name = "FILE")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PathBuf>,

    /// Print the hex mask legend before generating.
    #[arg(long, value_name = "BOOL")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<bool>,

    /// Report progress updates every specified interval (e.g., "1s", "500ms").
    #[arg(long, value_name = "DURATION", value_parser = parse_interval)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_interval: Option<String>,

    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_log_level: Option<GlobalLogLevel>,

    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_log_level: Option<ProgressLogLevel>,
}

fn parse_interval(raw: &str) -> Result<String, humantime::DurationError> {
    humantime::parse_duration(raw)?;
    Ok(raw.to_string())
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: Mode,
    pub width: usize,
    pub height: usize,
    pub seed: Option<u64>,
    pub attempts: usize,
    pub frame: bool,
    pub border: Tile,
    pub center: Tile,
    pub batches: usize,
    pub batch_size: usize,
    pub max_iterations: Option<u64>,
    pub selection: SelectionStrategy,
    pub layout: BlockLayout,
    pub givens: Option<PathBuf>,
    pub visualization: VisualizationMode,
    pub sudoku_display: SudokuDisplay,
    pub snapshot: Option<PathBuf>,
    pub legend: bool,
    pub progress_interval: Option<String>,
    pub global_log_level: GlobalLogLevel,
    pub progress_log_level: ProgressLogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            width: 16,
            height: 16,
            seed: None,
            attempts: 1000,
            frame: true,
            border: Tile::Water,
            center: Tile::Stone,
            batches: 5,
            batch_size: 3,
            max_iterations: None,
            selection: SelectionStrategy::default(),
            layout: BlockLayout::default(),
            givens: None,
            visualization: VisualizationMode::default(),
            sudoku_display: SudokuDisplay::default(),
            snapshot: None,
            legend: false,
            progress_interval: None,
            global_log_level: GlobalLogLevel::default(),
            progress_log_level: ProgressLogLevel::default(),
        }
    }
}

impl AppConfig {
    /// Layers defaults, config file, environment and flags.
    pub fn resolve(&self) -> Result<Settings, AppError> {
        self.figment().extract().map_err(AppError::from)
    }

    fn figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(path) = &self.config {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed("WFC_"))
            .merge(Serialized::defaults(self))
    }
}

impl Settings {
    /// Rejects combinations the drivers cannot run.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.attempts == 0 {
            return Err(AppError::Config("attempts must be at least 1".into()));
        }
        if self.mode == Mode::Multi && (self.batches == 0 || self.batch_size == 0) {
            return Err(AppError::Config(
                "multi mode needs at least one batch of one map".into(),
            ));
        }
        self.report_interval()?;
        Ok(())
    }

    /// The parsed progress interval, if progress reporting is enabled.
    pub fn report_interval(&self) -> Result<Option<Duration>, AppError> {
        self.progress_interval
            .as_deref()
            .map(|raw| {
                humantime::parse_duration(raw)
                    .map_err(|e| AppError::Config(format!("invalid progress interval '{raw}': {e}")))
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        let config = AppConfig::try_parse_from(["wfc"]).unwrap();
        let settings = config.resolve().unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.report_interval().unwrap(), None);
    }

    #[test]
    fn test_basic_args() {
        let config = AppConfig::try_parse_from([
            "wfc",
            "--mode",
            "multi",
            "--width",
            "20",
            "--border",
            "sand",
            "--frame",
            "false",
            "--selection",
            "first-minimum",
        ])
        .unwrap();
        let settings = config.resolve().unwrap();
        assert_eq!(settings.mode, Mode::Multi);
        assert_eq!(settings.width, 20);
        assert_eq!(settings.height, 16);
        assert_eq!(settings.border, Tile::Sand);
        assert!(!settings.frame);
        assert_eq!(settings.selection, SelectionStrategy::FirstMinimum);
    }

    #[test]
    fn test_progress_interval() {
        let config =
            AppConfig::try_parse_from(["wfc", "--progress-interval", "250ms"]).unwrap();
        let settings = config.resolve().unwrap();
        assert_eq!(
            settings.report_interval().unwrap(),
            Some(Duration::from_millis(250))
        );
        assert!(AppConfig::try_parse_from(["wfc", "--progress-interval", "soon"]).is_err());
    }

    #[test]
    fn test_invalid_enum_value() {
        assert!(AppConfig::try_parse_from(["wfc", "--visualization", "window"]).is_err());
        assert!(AppConfig::try_parse_from(["wfc", "--layout", "residue"]).is_ok());
    }

    #[test]
    fn test_file_and_env_layers() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "wfc.toml",
                r#"
                    mode = "sudoku"
                    width = 30
                    height = 12
                    layout = "residue"
                "#,
            )?;
            jail.set_env("WFC_HEIGHT", "40");

            let config = AppConfig::try_parse_from(["wfc", "--config", "wfc.toml", "--width", "8"])
                .map_err(|e| e.to_string())?;
            let settings = config.resolve().map_err(|e| e.to_string())?;
            assert_eq!(settings.mode, Mode::Sudoku);
            assert_eq!(settings.layout, BlockLayout::Residue);
            // Flag beats file, env beats file.
            assert_eq!(settings.width, 8);
            assert_eq!(settings.height, 40);
            Ok(())
        });
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let settings = Settings {
            attempts: 0,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(AppError::Config(_))));
    }
}
