// src/miner/round.rs
//! Shared round state between the coordinator and the worker pool
//!
//! Phase, generation, target block and winner live together behind one
//! mutex so no participant can observe a half-updated round. Workers and the
//! coordinator block on the same condition variable; every transition wakes
//! all of them.

use crate::chain::Block;
use crate::miner::allocator::NonceAllocator;
use crate::types::{Phase, WorkerId};
use crate::utils::error::MinerError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// The winning submission of a round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    /// Worker whose claim was honored
    pub worker: WorkerId,
    /// Nonce that satisfied the difficulty
    pub nonce: u64,
    /// Hash the worker computed for that nonce
    pub hash: String,
}

/// How a round ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Exactly one worker claimed the round
    Won(Claim),
    /// The nonce space ran out before any hash met the difficulty
    Exhausted,
}

/// Everything a worker needs to search one round
#[derive(Debug, Clone)]
pub struct Ticket {
    /// Generation of the round this ticket belongs to
    pub generation: u64,
    /// Block whose header is being mined; never mutated while mining
    pub block: Arc<Block>,
    /// Nonce space of this round only
    pub nonces: Arc<NonceAllocator>,
}

#[derive(Debug)]
struct Inner {
    phase: Phase,
    generation: u64,
    target: Option<Arc<Block>>,
    nonces: Arc<NonceAllocator>,
    outcome: Option<RoundOutcome>,
    shutdown: bool,
}

/// Round state shared by the coordinator and every worker
///
/// Created once and reused for every round. Each call to
/// [`RoundState::arm`] starts a new generation; a claim carrying any other
/// generation is ignored.
#[derive(Debug)]
pub struct RoundState {
    inner: Mutex<Inner>,
    changed: Condvar,
    /// Last generation that left `Mining`; `u64::MAX` after shutdown
    settled: AtomicU64,
    difficulty: usize,
}

impl RoundState {
    /// Creates an idle round state for the given difficulty.
    pub fn new(difficulty: usize) -> Self {
        RoundState {
            inner: Mutex::new(Inner {
                phase: Phase::Idle,
                generation: 0,
                target: None,
                nonces: Arc::new(NonceAllocator::new()),
                outcome: None,
                shutdown: false,
            }),
            changed: Condvar::new(),
            settled: AtomicU64::new(0),
            difficulty,
        }
    }

    // Every transition leaves `Inner` consistent before it can panic, so a
    // poisoned lock still guards valid state.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, Inner>) -> MutexGuard<'a, Inner> {
        self.changed
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Required count of leading hex zeros.
    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    /// Generation of the most recently armed round.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Worker that won the current round, if it has been claimed.
    pub fn winner(&self) -> Option<WorkerId> {
        match &self.lock().outcome {
            Some(RoundOutcome::Won(claim)) => Some(claim.worker),
            _ => None,
        }
    }

    /// Block installed for the current round, if one is armed.
    pub fn target(&self) -> Option<Arc<Block>> {
        self.lock().target.clone()
    }

    /// Nonces handed out so far in the current round.
    pub fn nonces_issued(&self) -> u64 {
        self.lock().nonces.issued()
    }

    /// Installs `block` as the target, opens a fresh nonce space and moves
    /// `Idle -> Mining`. Returns the new generation.
    pub fn arm(&self, block: Arc<Block>) -> Result<u64, MinerError> {
        self.arm_with(block, NonceAllocator::new())
    }

    fn arm_with(&self, block: Arc<Block>, nonces: NonceAllocator) -> Result<u64, MinerError> {
        let mut inner = self.lock();
        if inner.shutdown {
            return Err(MinerError::RoundError("round state is shut down".into()));
        }
        if inner.phase != Phase::Idle {
            return Err(MinerError::RoundError(format!(
                "cannot arm generation {} while {}",
                inner.generation + 1,
                inner.phase
            )));
        }

        inner.target = Some(block);
        inner.nonces = Arc::new(nonces);
        inner.outcome = None;
        inner.generation += 1;
        inner.phase = Phase::Mining;
        let generation = inner.generation;
        drop(inner);

        log::trace!("Armed round generation {}", generation);
        self.changed.notify_all();
        Ok(generation)
    }

    /// Blocks until a round newer than `last_seen` is mining.
    ///
    /// Returns `None` once the round state has been shut down.
    pub fn wait_for_mining(&self, last_seen: u64) -> Option<Ticket> {
        let mut inner = self.lock();
        loop {
            if inner.shutdown {
                return None;
            }
            if inner.phase == Phase::Mining && inner.generation > last_seen {
                if let Some(block) = &inner.target {
                    return Some(Ticket {
                        generation: inner.generation,
                        block: block.clone(),
                        nonces: inner.nonces.clone(),
                    });
                }
            }
            inner = self.wait(inner);
        }
    }

    /// Attempts to claim round `generation` for `worker`.
    ///
    /// Succeeds only for the first claim while that generation is mining.
    /// Winner identity and nonce are recorded in the same critical section,
    /// so the coordinator always reads the nonce that won.
    pub fn claim(&self, generation: u64, worker: WorkerId, nonce: u64, hash: String) -> bool {
        self.settle(
            generation,
            RoundOutcome::Won(Claim {
                worker,
                nonce,
                hash,
            }),
        )
    }

    /// Ends round `generation` without a winner because its nonce space ran
    /// out. A no-op if the round already left `Mining`.
    pub fn exhaust(&self, generation: u64) -> bool {
        self.settle(generation, RoundOutcome::Exhausted)
    }

    fn settle(&self, generation: u64, outcome: RoundOutcome) -> bool {
        let mut inner = self.lock();
        if inner.generation != generation || inner.phase != Phase::Mining {
            return false;
        }

        inner.outcome = Some(outcome);
        inner.phase = Phase::Claimed;
        self.settled.store(generation, Ordering::Release);
        drop(inner);

        self.changed.notify_all();
        true
    }

    /// Lock-free check used by searching workers: `true` once round
    /// `generation` is no longer mining.
    pub fn is_settled(&self, generation: u64) -> bool {
        self.settled.load(Ordering::Acquire) >= generation
    }

    /// Blocks until round `generation` has been claimed or exhausted.
    pub fn wait_for_claim(&self, generation: u64) -> Result<RoundOutcome, MinerError> {
        let mut inner = self.lock();
        loop {
            if inner.shutdown {
                return Err(MinerError::RoundError(
                    "round state shut down while mining".into(),
                ));
            }
            if inner.generation != generation {
                return Err(MinerError::RoundError(format!(
                    "waiting on generation {} but round is at {}",
                    generation, inner.generation
                )));
            }
            if inner.phase == Phase::Claimed {
                if let Some(outcome) = &inner.outcome {
                    return Ok(outcome.clone());
                }
            }
            inner = self.wait(inner);
        }
    }

    /// Returns the round to `Idle` and clears the winner and target.
    pub fn reset(&self) {
        let mut inner = self.lock();
        if inner.phase == Phase::Mining {
            // Late workers must stop searching a round nobody waits for.
            self.settled.store(inner.generation, Ordering::Release);
        }
        inner.phase = Phase::Idle;
        inner.outcome = None;
        inner.target = None;
    }

    /// Stops the round state for good and wakes every waiter.
    pub fn shutdown(&self) {
        let mut inner = self.lock();
        inner.shutdown = true;
        self.settled.store(u64::MAX, Ordering::Release);
        drop(inner);
        self.changed.notify_all();
    }
}
