// src/utils/error.rs
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Main error type for the mining application
///
/// Validation failures after a mining round are not represented here:
/// they are the normal retry path of the coordinator, not errors.
#[derive(Error, Debug)]
pub enum MinerError {
    /// Configuration file or parameter errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Standard I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Invalid or missing input records
    #[error("Invalid input: {0}")]
    InputError(String),

    /// A block was refused by the chain
    #[error("Chain error: {0}")]
    ChainError(String),

    /// Round protocol violations (arming a busy round, waiting on a stale one)
    #[error("Round error: {0}")]
    RoundError(String),

    /// Worker thread spawn or join failures
    #[error("Worker error: {0}")]
    WorkerError(String),

    /// Thread communication channel errors
    #[error("Thread communication error: {0}")]
    ChannelError(String),
}

/// Converts crossbeam channel send errors for round durations into MinerError
///
/// Raised when the statistics listener has gone away while the coordinator
/// is still reporting.
impl From<crossbeam_channel::SendError<Duration>> for MinerError {
    fn from(e: crossbeam_channel::SendError<Duration>) -> Self {
        MinerError::ChannelError(format!("Duration send failed: {}", e))
    }
}

/// Converts TOML parse errors into MinerError
impl From<toml::de::Error> for MinerError {
    fn from(e: toml::de::Error) -> Self {
        MinerError::ConfigError(format!("Invalid config format: {}", e))
    }
}
