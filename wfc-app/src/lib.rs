//! Command line front end for the grid solvers.
//!
//! Resolves settings, initializes logging, and runs one of the terrain or
//! Sudoku drivers in [`setup::execution`].

pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod setup;
pub mod visualization;

pub use config::{AppConfig, Settings};
pub use error::AppError;

use anyhow::Result;
use clap::Parser;
use std::sync::{atomic::AtomicBool, Arc};

/// Parses the command line and runs the selected mode.
pub fn run() -> Result<()> {
    run_with(&AppConfig::parse())
}

/// Runs with already parsed arguments.
pub fn run_with(args: &AppConfig) -> Result<()> {
    let settings = args.resolve()?;
    settings.validate()?;
    logging::init_logger(&settings);
    log::debug!("Resolved settings: {:?}", settings);

    let mut stdout = std::io::stdout().lock();
    if settings.legend {
        use std::io::Write;
        write!(stdout, "{}", visualization::mask_legend())?;
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    setup::execution::execute(&settings, &shutdown, &mut stdout)
}
