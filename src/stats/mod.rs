//! Statistics collection and reporting module
//!
//! The coordinator hands over one raw duration per committed block; the
//! [`StatsReporter`] aggregates block count, total, average, fastest and
//! slowest durations and can log progress periodically.

/// Submodule containing the statistics reporter implementation
///
/// The reporter handles:
/// - Atomic collection of block durations
/// - Periodic progress logging
/// - Thread-safe communication channels for receiving data
pub mod reporter;

// Re-export main components
pub use reporter::{MiningStats, StatsReporter};
