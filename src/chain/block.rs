// src/chain/block.rs
use crate::chain::hasher::hash_header;
use serde::{Deserialize, Serialize};

/// A single block of the chain
///
/// The `hash` field is always derived from the other four fields; the only
/// way to change the nonce is [`Block::seal`], which re-derives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    data: String,
    previous_hash: String,
    /// Milliseconds since the Unix epoch
    timestamp: i64,
    nonce: u64,
    hash: String,
}

impl Block {
    /// Creates an unmined block with nonce 0.
    pub fn new(data: impl Into<String>, previous_hash: impl Into<String>, timestamp: i64) -> Self {
        let mut block = Block {
            data: data.into(),
            previous_hash: previous_hash.into(),
            timestamp,
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// Reassembles a block from stored fields without re-deriving its hash.
    ///
    /// The result may be inconsistent; run it through
    /// [`Chain::validate`](crate::chain::Chain::validate) before trusting it.
    pub fn from_parts(
        data: impl Into<String>,
        previous_hash: impl Into<String>,
        timestamp: i64,
        nonce: u64,
        hash: impl Into<String>,
    ) -> Self {
        Block {
            data: data.into(),
            previous_hash: previous_hash.into(),
            timestamp,
            nonce,
            hash: hash.into(),
        }
    }

    /// Sets the winning nonce and recomputes the hash.
    pub fn seal(&mut self, nonce: u64) {
        self.nonce = nonce;
        self.hash = self.compute_hash();
    }

    /// Hash of this block's header fields, ignoring the stored `hash`.
    pub fn compute_hash(&self) -> String {
        hash_header(&self.previous_hash, self.timestamp, self.nonce, &self.data)
    }

    /// Hash this block would have with a different nonce.
    pub fn hash_with_nonce(&self, nonce: u64) -> String {
        hash_header(&self.previous_hash, self.timestamp, nonce, &self.data)
    }

    /// Opaque record payload.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Hash of the parent block, empty for genesis.
    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    /// Header timestamp in milliseconds.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Current nonce.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Stored header hash.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Genesis blocks link to nothing.
    pub fn is_genesis(&self) -> bool {
        self.previous_hash.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::Block;

    #[test]
    fn new_block_starts_at_nonce_zero_with_derived_hash() {
        let b = Block::new("genesis", "", 1_000);
        assert_eq!(b.nonce(), 0);
        assert_eq!(b.hash(), b.compute_hash());
        assert!(b.is_genesis());
    }

    #[test]
    fn seal_rederives_hash() {
        let mut b = Block::new("a", "prev", 1_000);
        let before = b.hash().to_string();
        b.seal(17);
        assert_eq!(b.nonce(), 17);
        assert_eq!(b.hash(), b.hash_with_nonce(17));
        assert_ne!(b.hash(), before);
    }

    #[test]
    fn from_parts_keeps_stored_hash() {
        let b = Block::from_parts("a", "prev", 1, 2, "deadbeef");
        assert_eq!(b.hash(), "deadbeef");
        assert_ne!(b.hash(), b.compute_hash());
        assert!(!b.is_genesis());
    }
}
