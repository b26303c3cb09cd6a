// src/miner/coordinator.rs
//! Round coordinator
//!
//! Drives one round per input record: arms the worker pool with a candidate
//! block, waits for the claim, validates the sealed block against the chain
//! and either commits it or retries the same record with a fresh timestamp.

use crate::chain::{Block, Chain};
use crate::config::Config;
use crate::miner::round::{RoundOutcome, RoundState};
use crate::miner::worker::Worker;
use crate::types::WorkerId;
use crate::utils::error::MinerError;
use chrono::Utc;
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Callback run on every sealed candidate right before validation
///
/// Receives the 1-based attempt number for the current record.
pub type PreValidateHook = Box<dyn FnMut(u32, &mut Block) + Send>;

/// Owns the worker pool, the shared round state and the chain
pub struct Coordinator {
    /// Round state shared with every worker
    round: Arc<RoundState>,
    /// Persistent worker threads
    workers: Vec<JoinHandle<()>>,
    /// Committed blocks
    chain: Chain,
    /// Per-record mining durations, if someone is listening
    durations: Option<Sender<Duration>>,
    pre_validate: Option<PreValidateHook>,
    /// Last header timestamp handed out, in milliseconds
    last_timestamp: i64,
}

impl Coordinator {
    /// Creates a coordinator and starts `workers` mining threads
    ///
    /// # Arguments
    /// * `difficulty` - Leading hex zeros required in every block hash
    /// * `workers` - Size of the persistent worker pool (at least 1)
    pub fn new(difficulty: usize, workers: usize) -> Result<Self, MinerError> {
        if workers == 0 {
            return Err(MinerError::ConfigError(
                "at least one worker thread is required".into(),
            ));
        }

        let round = Arc::new(RoundState::new(difficulty));
        let mut coordinator = Coordinator {
            round: round.clone(),
            workers: Vec::with_capacity(workers),
            chain: Chain::new(difficulty),
            durations: None,
            pre_validate: None,
            last_timestamp: 0,
        };

        for id in 1..=workers {
            // Drop stops the threads spawned so far on error.
            let handle = Worker::new(WorkerId(id), round.clone()).spawn()?;
            coordinator.workers.push(handle);
        }

        log::info!(
            "Started {} mining workers (difficulty {})",
            workers,
            difficulty
        );
        Ok(coordinator)
    }

    /// Creates a coordinator from a validated configuration.
    pub fn from_config(config: &Config) -> Result<Self, MinerError> {
        config.validate()?;
        Self::new(config.difficulty, config.worker_threads)
    }

    /// Reports the duration of every committed record on `sender`.
    pub fn with_duration_sender(mut self, sender: Sender<Duration>) -> Self {
        self.durations = Some(sender);
        self
    }

    /// Installs a hook that may inspect or alter each sealed candidate before
    /// it is validated.
    pub fn on_pre_validate<F>(&mut self, hook: F)
    where
        F: FnMut(u32, &mut Block) + Send + 'static,
    {
        self.pre_validate = Some(Box::new(hook));
    }

    /// Mines every record in order; the first one becomes the genesis block.
    pub fn run<I>(&mut self, records: I) -> Result<(), MinerError>
    where
        I: IntoIterator<Item = String>,
    {
        for data in records {
            self.mine_record(data)?;
        }
        log::info!("Chain complete with {} blocks", self.chain.len());
        Ok(())
    }

    /// Mines and commits one block carrying `data`
    ///
    /// Retries the round with the same data and previous hash until the
    /// sealed block validates. There is no retry limit.
    pub fn mine_record(&mut self, data: String) -> Result<&Block, MinerError> {
        let started = Instant::now();
        let index = self.chain.len();
        let previous_hash = self.chain.tip_hash().to_string();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let timestamp = self.next_timestamp();
            let candidate = Arc::new(Block::new(data.clone(), previous_hash.clone(), timestamp));

            let generation = self.round.arm(candidate.clone())?;
            let outcome = self.round.wait_for_claim(generation)?;

            let claim = match outcome {
                RoundOutcome::Won(claim) => claim,
                RoundOutcome::Exhausted => {
                    log::warn!(
                        "Block {} exhausted its nonce space on attempt {}; retrying",
                        index,
                        attempt
                    );
                    self.round.reset();
                    continue;
                }
            };

            let mut block = Block::clone(&candidate);
            block.seal(claim.nonce);
            log::debug!(
                "Block {} claimed by {} with nonce {} (hash {})",
                index,
                claim.worker,
                claim.nonce,
                block.hash()
            );

            if let Some(hook) = self.pre_validate.as_mut() {
                hook(attempt, &mut block);
            }

            if self.chain.validate(&block) {
                self.round.reset();
                self.chain.append(block)?;
                break;
            }

            log::warn!(
                "Block {} failed validation on attempt {}; retrying with a fresh timestamp",
                index,
                attempt
            );
            self.round.reset();
        }

        let elapsed = started.elapsed();
        log::info!(
            "Block {} mined in {:.3} ms after {} attempt(s)",
            index,
            elapsed.as_secs_f64() * 1000.0,
            attempt
        );
        if let Some(sender) = &self.durations {
            sender.send(elapsed)?;
        }

        self.chain
            .tip()
            .ok_or_else(|| MinerError::ChainError("committed block missing from chain".into()))
    }

    /// Header timestamps strictly increase, so a retry never reuses a header.
    fn next_timestamp(&mut self) -> i64 {
        let now = Utc::now().timestamp_millis();
        self.last_timestamp = now.max(self.last_timestamp + 1);
        self.last_timestamp
    }

    /// The chain mined so far.
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Number of persistent workers.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Stops the worker pool and returns the chain.
    pub fn into_chain(mut self) -> Result<Chain, MinerError> {
        self.shutdown()?;
        let difficulty = self.chain.difficulty();
        Ok(std::mem::replace(&mut self.chain, Chain::new(difficulty)))
    }

    /// Signals every worker to exit and joins them.
    pub fn shutdown(&mut self) -> Result<(), MinerError> {
        self.round.shutdown();
        // Drop the sender so a stats listener can drain and exit.
        self.durations = None;

        let mut panicked = 0;
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                panicked += 1;
            }
        }

        if panicked > 0 {
            return Err(MinerError::WorkerError(format!(
                "{} worker thread(s) panicked",
                panicked
            )));
        }
        Ok(())
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::error!("Worker shutdown failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn records(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn mines_linked_chain_end_to_end() {
        let mut coordinator = Coordinator::new(1, 4).unwrap();
        coordinator.run(records(&["genesis", "a", "b"])).unwrap();
        let chain = coordinator.into_chain().unwrap();

        let blocks = chain.blocks();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].previous_hash(), "");
        for i in 1..blocks.len() {
            assert_eq!(blocks[i].previous_hash(), blocks[i - 1].hash());
        }
        for (block, data) in blocks.iter().zip(["genesis", "a", "b"]) {
            assert!(block.hash().starts_with('0'));
            assert_eq!(block.hash(), block.compute_hash());
            assert_eq!(block.data(), data);
        }
        assert!(chain.verify());
    }

    #[test]
    fn single_worker_pool_mines_too() {
        let mut coordinator = Coordinator::new(2, 1).unwrap();
        let block = coordinator.mine_record("solo".into()).unwrap();
        assert!(block.hash().starts_with("00"));
        assert_eq!(coordinator.worker_count(), 1);
    }

    #[test]
    fn failed_validation_retries_same_record_with_fresh_header() {
        let mut coordinator = Coordinator::new(1, 3).unwrap();
        coordinator.mine_record("genesis".into()).unwrap();

        // (attempt, armed candidate, sealed block before any tampering)
        let seen: Arc<Mutex<Vec<(u32, Block, Block)>>> = Arc::default();
        let sink = seen.clone();
        let round = coordinator.round.clone();
        coordinator.on_pre_validate(move |attempt, block| {
            let armed = round.target().expect("round is armed during validation");
            sink.lock()
                .unwrap()
                .push((attempt, Block::clone(&armed), block.clone()));
            if attempt == 1 {
                *block = Block::from_parts(
                    block.data(),
                    "stale",
                    block.timestamp(),
                    block.nonce(),
                    block.hash(),
                );
            }
        });

        let genesis_hash = coordinator.chain().tip_hash().to_string();
        let committed = coordinator.mine_record("a".into()).unwrap().clone();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        let (first_attempt, first_armed, first) = &seen[0];
        let (second_attempt, second_armed, second) = &seen[1];
        assert_eq!((*first_attempt, *second_attempt), (1, 2));

        // every attempt starts from an unmined candidate at nonce 0
        assert_eq!(first_armed.nonce(), 0);
        assert_eq!(second_armed.nonce(), 0);
        assert_eq!(second_armed.hash(), second_armed.compute_hash());
        assert!(second_armed.timestamp() > first_armed.timestamp());

        assert_eq!(second.data(), "a");
        assert_eq!(second.previous_hash(), genesis_hash);
        assert_eq!(second.timestamp(), second_armed.timestamp());
        assert!(second.timestamp() > first.timestamp());

        let mut resealed = second_armed.clone();
        resealed.seal(second.nonce());
        assert_eq!(&resealed, second);

        assert_eq!(&committed, second);
        assert_eq!(coordinator.chain().len(), 2);
        assert!(coordinator.chain().verify());
    }

    #[test]
    fn reports_one_duration_per_committed_block() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut coordinator = Coordinator::new(1, 2).unwrap().with_duration_sender(tx);
        coordinator.run(records(&["genesis", "x"])).unwrap();
        coordinator.shutdown().unwrap();

        assert_eq!(rx.iter().count(), 2);
    }

    #[test]
    fn zero_workers_is_a_config_error() {
        assert!(matches!(
            Coordinator::new(1, 0),
            Err(MinerError::ConfigError(_))
        ));
    }

    #[test]
    fn timestamps_strictly_increase() {
        let mut coordinator = Coordinator::new(0, 1).unwrap();
        let a = coordinator.next_timestamp();
        let b = coordinator.next_timestamp();
        assert!(b > a);
    }
}
