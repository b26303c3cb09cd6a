// src/miner/mod.rs
//! Core mining functionality
//!
//! This module contains all components related to the mining process:
//! - Nonce allocation for a round
//! - The round state shared between coordinator and workers
//! - Worker thread management
//! - The coordinator that turns records into committed blocks

/// Per-round nonce allocation
pub mod allocator;

/// Round coordinator
///
/// Arms rounds, waits for the claim, validates and commits or retries.
pub mod coordinator;

/// Shared round state
///
/// Phase, generation, target block and winner behind a single lock.
pub mod round;

/// Worker thread implementation
///
/// Persistent workers that race for each round's winning nonce.
pub mod worker;

// Re-export main components for cleaner imports
pub use self::allocator::NonceAllocator;
pub use self::coordinator::{Coordinator, PreValidateHook};
pub use self::round::{Claim, RoundOutcome, RoundState, Ticket};
pub use self::worker::{SearchOutcome, Worker};
