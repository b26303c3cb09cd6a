// src/types.rs
use std::fmt;

/// Identifier of a persistent mining worker (1-based)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct WorkerId(pub usize);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// Phase of the shared mining round
///
/// A round moves `Idle -> Mining -> Claimed` and is put back to `Idle` by the
/// coordinator once the claimed nonce has been committed or rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No round armed; workers wait
    Idle,
    /// Workers are searching the nonce space of the target block
    Mining,
    /// A worker has claimed the round (or the nonce space ran out)
    Claimed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Mining => write!(f, "mining"),
            Phase::Claimed => write!(f, "claimed"),
        }
    }
}
