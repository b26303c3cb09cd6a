//! Block data model, header hashing and chain validation

/// SHA-256 header hashing and the difficulty predicate
pub mod hasher;

/// The [`Block`] record
pub mod block;

/// The append-only [`Chain`] and its validation rules
pub mod chain;

pub use self::block::Block;
pub use self::chain::Chain;
pub use self::hasher::{hash_header, meets_difficulty};
