//! Setup module for the application.
//!
//! Builds the per-step hook and runs the configured mode.

pub mod execution;
pub mod visualization;
