// src/miner/allocator.rs
//! Shared nonce source for one mining round

use std::sync::atomic::{AtomicU64, Ordering};

/// Linearizable source of strictly increasing nonces
///
/// Every armed round gets a fresh allocator, so a worker still holding the
/// previous round's allocator can never consume nonces of the new round.
///
/// Within one round the values handed out are exactly `0, 1, .., k-1`, each
/// to a single caller. The counter never wraps: once `u64::MAX` values have
/// been issued, [`NonceAllocator::next`] returns `None` and the round has no
/// winner.
#[derive(Debug, Default)]
pub struct NonceAllocator {
    counter: AtomicU64,
}

impl NonceAllocator {
    /// Creates an allocator starting at 0.
    pub fn new() -> Self {
        NonceAllocator {
            counter: AtomicU64::new(0),
        }
    }

    /// Draws the next nonce, or `None` when the nonce space is exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&self) -> Option<u64> {
        self.counter
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_add(1))
            .ok()
    }

    /// Number of nonces handed out so far in this round.
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::Acquire)
    }

    #[cfg(test)]
    pub(crate) fn starting_at(start: u64) -> Self {
        NonceAllocator {
            counter: AtomicU64::new(start),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NonceAllocator;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn sequential_values_start_at_zero() {
        let alloc = NonceAllocator::new();
        assert_eq!(alloc.next(), Some(0));
        assert_eq!(alloc.next(), Some(1));
        assert_eq!(alloc.issued(), 2);
    }

    #[test]
    fn concurrent_draws_form_a_gapless_prefix() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 5_000;

        let alloc = Arc::new(NonceAllocator::new());
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let alloc = alloc.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    (0..PER_THREAD)
                        .map(|_| alloc.next().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();

        let expected: Vec<u64> = (0..(THREADS * PER_THREAD) as u64).collect();
        assert_eq!(all, expected);
        assert_eq!(alloc.issued(), (THREADS * PER_THREAD) as u64);
    }

    #[test]
    fn exhaustion_does_not_wrap() {
        let alloc = NonceAllocator::starting_at(u64::MAX - 1);
        assert_eq!(alloc.next(), Some(u64::MAX - 1));
        assert_eq!(alloc.next(), None);
        assert_eq!(alloc.next(), None);
        assert_eq!(alloc.issued(), u64::MAX);
    }
}
