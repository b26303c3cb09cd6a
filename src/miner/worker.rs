// src/miner/worker.rs
//! Worker thread implementation
//!
//! A worker is created once and serves every round: it waits for the round
//! to be armed, pulls nonces from the shared allocator until it either wins
//! the claim or sees another worker's claim, then goes back to waiting.

use crate::chain::meets_difficulty;
use crate::miner::round::{RoundState, Ticket};
use crate::types::WorkerId;
use crate::utils::error::MinerError;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Result of searching one round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// This worker's claim was honored
    Won {
        /// The winning nonce
        nonce: u64,
    },
    /// Another worker claimed the round first
    Lost,
    /// The round's nonce space ran out
    Exhausted,
}

/// Persistent mining worker
pub struct Worker {
    /// Identity recorded in the round when this worker wins
    id: WorkerId,
    /// Round state shared with the coordinator and the other workers
    round: Arc<RoundState>,
}

impl Worker {
    /// Creates a new Worker instance
    ///
    /// # Arguments
    /// * `id` - Identity reported when this worker claims a round
    /// * `round` - Shared round state to observe
    pub fn new(id: WorkerId, round: Arc<RoundState>) -> Self {
        Worker { id, round }
    }

    /// Identity of this worker.
    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Moves the worker onto its own named thread.
    pub fn spawn(self) -> Result<JoinHandle<()>, MinerError> {
        thread::Builder::new()
            .name(format!("miner-{}", self.id))
            .spawn(move || self.run())
            .map_err(|e| MinerError::WorkerError(format!("Failed to spawn worker: {}", e)))
    }

    /// Serves rounds until the round state shuts down.
    pub fn run(&self) {
        log::debug!("{} started", self.id);
        let mut last_seen = 0;

        while let Some(ticket) = self.round.wait_for_mining(last_seen) {
            last_seen = ticket.generation;
            let outcome = self.search(&ticket);
            log::trace!(
                "{} finished generation {}: {:?}",
                self.id,
                ticket.generation,
                outcome
            );
        }

        log::debug!("{} stopped", self.id);
    }

    /// Searches the nonce space of one round.
    pub fn search(&self, ticket: &Ticket) -> SearchOutcome {
        self.search_with(ticket, |_| {})
    }

    /// Like [`Worker::search`], calling `on_draw` with every nonce taken from
    /// the round's allocator.
    pub fn search_with<F>(&self, ticket: &Ticket, mut on_draw: F) -> SearchOutcome
    where
        F: FnMut(u64),
    {
        let difficulty = self.round.difficulty();
        let block = &ticket.block;

        loop {
            let Some(nonce) = ticket.nonces.next() else {
                self.round.exhaust(ticket.generation);
                return SearchOutcome::Exhausted;
            };
            on_draw(nonce);

            let hash = block.hash_with_nonce(nonce);
            if meets_difficulty(&hash, difficulty) {
                if self.round.claim(ticket.generation, self.id, nonce, hash) {
                    log::debug!(
                        "{} claimed generation {} with nonce {}",
                        self.id,
                        ticket.generation,
                        nonce
                    );
                    return SearchOutcome::Won { nonce };
                }
                return SearchOutcome::Lost;
            }

            if self.round.is_settled(ticket.generation) {
                return SearchOutcome::Lost;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Block;
    use crate::miner::round::{Claim, RoundOutcome};

    #[test]
    fn lone_worker_wins_its_round() {
        let round = Arc::new(RoundState::new(1));
        let block = Arc::new(Block::new("data", "", 42));
        round.arm(block.clone()).unwrap();

        let worker = Worker::new(WorkerId(7), round.clone());
        let ticket = round.wait_for_mining(0).unwrap();
        let SearchOutcome::Won { nonce } = worker.search(&ticket) else {
            panic!("single worker must win");
        };

        assert!(block.hash_with_nonce(nonce).starts_with('0'));
        assert_eq!(round.winner(), Some(WorkerId(7)));
        // nonces are tested in order, so the winner is the first match
        assert!((0..nonce).all(|n| !block.hash_with_nonce(n).starts_with('0')));
    }

    #[test]
    fn worker_stops_once_round_is_claimed() {
        let round = Arc::new(RoundState::new(64));
        let generation = round.arm(Arc::new(Block::new("data", "", 42))).unwrap();
        let ticket = round.wait_for_mining(0).unwrap();
        assert!(round.claim(generation, WorkerId(1), 0, "0".repeat(64)));

        let worker = Worker::new(WorkerId(2), round.clone());
        assert_eq!(worker.search(&ticket), SearchOutcome::Lost);
        // one draw, no match, settled: stop without further allocations
        assert_eq!(ticket.nonces.issued(), 1);
        assert!(matches!(
            round.wait_for_claim(generation).unwrap(),
            RoundOutcome::Won(Claim { worker: WorkerId(1), .. })
        ));
    }
}
