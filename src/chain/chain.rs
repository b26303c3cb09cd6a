// src/chain/chain.rs
use crate::chain::block::Block;
use crate::chain::hasher::meets_difficulty;
use crate::utils::error::MinerError;

/// Ordered, append-only, in-memory sequence of committed blocks
///
/// Every block in `blocks` passed [`Chain::validate`] against the chain as it
/// was when the block was appended.
#[derive(Debug, Clone)]
pub struct Chain {
    blocks: Vec<Block>,
    difficulty: usize,
}

impl Chain {
    /// Creates an empty chain requiring `difficulty` leading hex zeros.
    pub fn new(difficulty: usize) -> Self {
        Chain {
            blocks: Vec::new(),
            difficulty,
        }
    }

    /// Checks `block` as the next block of this chain.
    ///
    /// Accepts iff the block links to the tip (or has an empty previous hash
    /// when the chain is empty), its stored hash equals the recomputed one,
    /// and that hash meets the difficulty.
    pub fn validate(&self, block: &Block) -> bool {
        let linked = match self.blocks.last() {
            Some(tip) => block.previous_hash() == tip.hash(),
            None => block.is_genesis(),
        };

        linked
            && block.hash() == block.compute_hash()
            && meets_difficulty(block.hash(), self.difficulty)
    }

    /// Appends `block` if it passes [`Chain::validate`].
    pub fn append(&mut self, block: Block) -> Result<(), MinerError> {
        if !self.validate(&block) {
            return Err(MinerError::ChainError(format!(
                "block {} rejected (hash {}, previous {:?})",
                self.blocks.len(),
                block.hash(),
                block.previous_hash()
            )));
        }
        self.blocks.push(block);
        Ok(())
    }

    /// Re-checks linkage, hash integrity and difficulty for every block.
    pub fn verify(&self) -> bool {
        let mut replay = Chain::new(self.difficulty);
        self.blocks
            .iter()
            .all(|block| replay.append(block.clone()).is_ok())
    }

    /// Last committed block, if any.
    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Hash a new block must link to; empty while the chain is empty.
    pub fn tip_hash(&self) -> &str {
        self.tip().map(Block::hash).unwrap_or_default()
    }

    /// All committed blocks, genesis first.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of committed blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// `true` before the genesis block is committed.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Required count of leading hex zeros.
    pub fn difficulty(&self) -> usize {
        self.difficulty
    }
}

#[cfg(test)]
mod tests {
    use super::Chain;
    use crate::chain::block::Block;

    fn mine(mut block: Block, difficulty: usize) -> Block {
        let prefix = "0".repeat(difficulty);
        let nonce = (0u64..)
            .find(|n| block.hash_with_nonce(*n).starts_with(&prefix))
            .unwrap();
        block.seal(nonce);
        block
    }

    #[test]
    fn accepts_mined_genesis() {
        let chain = Chain::new(1);
        let genesis = mine(Block::new("genesis", "", 1_000), 1);
        assert!(chain.validate(&genesis));
    }

    #[test]
    fn genesis_must_have_empty_previous_hash() {
        let chain = Chain::new(1);
        let block = mine(Block::new("genesis", "00", 1_000), 1);
        assert!(!chain.validate(&block));
    }

    #[test]
    fn rejects_broken_linkage() {
        let mut chain = Chain::new(1);
        chain
            .append(mine(Block::new("genesis", "", 1_000), 1))
            .unwrap();

        let stale = mine(Block::new("a", "0123", 1_001), 1);
        assert!(!chain.validate(&stale));

        let linked = mine(Block::new("a", chain.tip_hash(), 1_001), 1);
        assert!(chain.validate(&linked));
    }

    #[test]
    fn rejects_stored_hash_mismatch() {
        let chain = Chain::new(1);
        let good = mine(Block::new("genesis", "", 1_000), 1);
        let forged = Block::from_parts(
            "tampered",
            good.previous_hash(),
            good.timestamp(),
            good.nonce(),
            good.hash(),
        );
        assert!(!chain.validate(&forged));
    }

    #[test]
    fn rejects_insufficient_difficulty() {
        let chain = Chain::new(2);
        let mut block = Block::new("genesis", "", 1_000);
        let nonce = (0u64..)
            .find(|n| {
                let h = block.hash_with_nonce(*n);
                h.starts_with('0') && !h.starts_with("00")
            })
            .unwrap();
        block.seal(nonce);
        assert!(!chain.validate(&block));
    }

    #[test]
    fn append_refuses_invalid_block_and_keeps_chain_intact() {
        let mut chain = Chain::new(1);
        let unmined = Block::from_parts("genesis", "", 1, 0, "f".repeat(64));
        assert!(chain.append(unmined).is_err());
        assert!(chain.is_empty());
        assert_eq!(chain.tip_hash(), "");
    }

    #[test]
    fn verify_replays_whole_chain() {
        let mut chain = Chain::new(1);
        for (i, data) in ["genesis", "a", "b"].iter().enumerate() {
            let block = mine(Block::new(*data, chain.tip_hash(), 1_000 + i as i64), 1);
            chain.append(block).unwrap();
        }
        assert_eq!(chain.len(), 3);
        assert!(chain.verify());
        assert_eq!(chain.blocks()[1].previous_hash(), chain.blocks()[0].hash());
    }
}
