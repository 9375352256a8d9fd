//! Logging setup for the application.

use crate::config::{GlobalLogLevel, ProgressLogLevel, Settings};
use env_logger::{Builder, Env};
use log::LevelFilter;

impl From<ProgressLogLevel> for LevelFilter {
    fn from(level: ProgressLogLevel) -> Self {
        match level {
            ProgressLogLevel::Trace => Self::Trace,
            ProgressLogLevel::Debug => Self::Debug,
            ProgressLogLevel::Info => Self::Info,
            ProgressLogLevel::Warn => Self::Warn,
        }
    }
}

impl From<GlobalLogLevel> for LevelFilter {
    fn from(level: GlobalLogLevel) -> Self {
        match level {
            GlobalLogLevel::Trace => Self::Trace,
            GlobalLogLevel::Debug => Self::Debug,
            GlobalLogLevel::Info => Self::Info,
            GlobalLogLevel::Warn => Self::Warn,
            GlobalLogLevel::Error => Self::Error,
        }
    }
}

/// Builds the logger configured by `settings`.
///
/// - Without `RUST_LOG`, everything logs at `settings.global_log_level`.
/// - With `RUST_LOG` set, its directives are used instead of the global level.
/// - Progress reports always use `settings.progress_log_level`.
pub fn build_logger(settings: &Settings) -> Builder {
    let mut builder = Builder::from_env(Env::default());
    if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(settings.global_log_level.into());
    }
    builder.filter_module(
        "wfc_app::progress",
        settings.progress_log_level.into(),
    );
    builder
}

/// Initializes the global logger. A second call only logs a debug line.
pub fn init_logger(settings: &Settings) {
    if build_logger(settings).try_init().is_err() {
        log::debug!("Logger already initialized");
        return;
    }
    log::debug!(
        "Logger initialized with global log level: {:?}, progress log level: {:?}",
        settings.global_log_level,
        settings.progress_log_level
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_conversions() {
        assert_eq!(LevelFilter::from(GlobalLogLevel::Error), LevelFilter::Error);
        assert_eq!(LevelFilter::from(ProgressLogLevel::Trace), LevelFilter::Trace);
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let settings = Settings::default();
        init_logger(&settings);
        init_logger(&settings);
    }
}
