//! Command-line interface definitions

/// Clap command and option types
pub mod commands;

pub use commands::{Action, BenchmarkOptions, Commands, ConfigOptions, MineOptions};
