// src/chain/hasher.rs
//! Block header hashing
//!
//! The preimage is the byte-level concatenation
//! `previous_hash ++ timestamp ++ nonce ++ data`, with the two integers
//! rendered in decimal. That field order is part of the external hash
//! contract; reordering it changes every block hash.

use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest.
pub const HASH_HEX_LEN: usize = 64;

/// Computes the lowercase hex SHA-256 digest of a block header.
///
/// SHA-256 is compiled in, so there is no failure mode to report.
pub fn hash_header(previous_hash: &str, timestamp: i64, nonce: u64, data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(previous_hash.as_bytes());
    hasher.update(timestamp.to_string().as_bytes());
    hasher.update(nonce.to_string().as_bytes());
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}

/// Returns `true` if the first `difficulty` characters of `hash` are all `'0'`.
pub fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
    hash.len() >= difficulty && hash.bytes().take(difficulty).all(|b| b == b'0')
}
