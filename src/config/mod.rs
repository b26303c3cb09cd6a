// src/config/mod.rs
//! Configuration management for the chain miner
//!
//! This module handles all configuration-related functionality including:
//! - Loading and parsing TOML configuration files
//! - Generating configuration templates
//! - Resolving the worker-count process parameter

/// Core configuration implementation
///
/// Contains the [`Config`] struct and the worker-count fallback rules.
pub mod config;

// Re-export key items for easy access
pub use config::{Config, DEFAULT_WORKER_THREADS, parse_worker_count};

use crate::utils::error::MinerError;
use std::path::PathBuf;

/// Loads miner configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the configuration file (anything convertible to PathBuf)
pub fn load(path: impl Into<PathBuf>) -> Result<Config, MinerError> {
    Config::load(path)
}

/// Generates a commented configuration template
pub fn generate_template() -> String {
    Config::generate_template()
}
