use thiserror::Error;

/// Errors raised while turning arguments into [`crate::Settings`].
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Configuration Error: {0}")]
    Figment(#[from] figment::Error),
}
