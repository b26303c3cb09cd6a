//! Chain Miner - parallel proof-of-work hash chain builder
//!
//! This crate turns a sequence of opaque records into an append-only hash
//! chain. Each block's SHA-256 header hash must start with a configured
//! number of hex zeros; the matching nonce is found by a persistent pool of
//! worker threads racing over a shared nonce counter:
//! - Exactly-once winner selection per round
//! - Post-hoc validation with retry on failure
//! - Per-block timing statistics

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Block model, header hashing and chain validation
pub mod chain;

/// Miner core: nonce allocation, round state, workers and coordinator
pub mod miner;

/// Statistics collection and reporting functionality
pub mod stats;

/// Utility functions and error handling
pub mod utils;

/// Command-line interface definitions
pub mod cli;

/// Configuration management
pub mod config;

/// Line-oriented record input
pub mod input;

/// Shared type definitions
pub mod types;

// Core exports
pub use chain::{Block, Chain, hash_header, meets_difficulty};
pub use cli::Commands;
pub use config::Config;
pub use miner::{Coordinator, NonceAllocator, RoundOutcome, RoundState, Worker};
pub use stats::{MiningStats, StatsReporter};
pub use types::{Phase, WorkerId};
pub use utils::{MinerError, init_logging};
