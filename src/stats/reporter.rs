// src/stats/reporter.rs
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Aggregate of per-block mining durations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MiningStats {
    /// Number of blocks mined
    pub blocks: u64,
    /// Sum of all block durations
    pub total: Duration,
    /// Mean block duration
    pub average: Duration,
    /// Shortest block duration
    pub fastest: Duration,
    /// Longest block duration
    pub slowest: Duration,
}

fn millis(d: Duration) -> String {
    format!("{:.4} ms.", d.as_secs_f64() * 1000.0)
}

impl fmt::Display for MiningStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=================== Data ===================")?;
        writeln!(f, "{:<32}{:>16}", "Number of blocks added:", self.blocks)?;
        writeln!(f, "{:<32}{:>16}", "Total execution time:", millis(self.total))?;
        writeln!(f, "{:<32}{:>16}", "Average block execution time:", millis(self.average))?;
        writeln!(f, "{:<32}{:>16}", "Fastest block execution time:", millis(self.fastest))?;
        write!(f, "{:<32}{:>16}", "Slowest block execution time:", millis(self.slowest))
    }
}

/// Atomic accumulator behind [`StatsReporter`]
struct BlockTimesAtomic {
    blocks: AtomicU64,
    total_nanos: AtomicU64,
    fastest_nanos: AtomicU64,
    slowest_nanos: AtomicU64,
    start_time: Instant,
}

impl BlockTimesAtomic {
    fn record(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.blocks.fetch_add(1, Ordering::Relaxed);
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.fastest_nanos.fetch_min(nanos, Ordering::Relaxed);
        self.slowest_nanos.fetch_max(nanos, Ordering::Relaxed);
    }

    fn snapshot(&self) -> MiningStats {
        let blocks = self.blocks.load(Ordering::Relaxed);
        if blocks == 0 {
            return MiningStats::default();
        }

        let total = self.total_nanos.load(Ordering::Relaxed);
        MiningStats {
            blocks,
            total: Duration::from_nanos(total),
            average: Duration::from_nanos(total / blocks),
            fastest: Duration::from_nanos(self.fastest_nanos.load(Ordering::Relaxed)),
            slowest: Duration::from_nanos(self.slowest_nanos.load(Ordering::Relaxed)),
        }
    }
}

/// Collects per-block mining durations and reports aggregates
///
/// The coordinator only hands over raw durations; counting, totals and the
/// min/max/average are computed here.
pub struct StatsReporter {
    /// Atomic counters for block statistics
    stats: Arc<BlockTimesAtomic>,
    /// Channel listener threads
    listeners: Vec<JoinHandle<()>>,
    /// Dropping this sender stops the periodic reporter
    stop: Option<Sender<()>>,
    /// Periodic reporter thread, if started
    reporting: Option<JoinHandle<()>>,
}

impl Default for StatsReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsReporter {
    /// Creates an empty reporter.
    pub fn new() -> Self {
        StatsReporter {
            stats: Arc::new(BlockTimesAtomic {
                blocks: AtomicU64::new(0),
                total_nanos: AtomicU64::new(0),
                fastest_nanos: AtomicU64::new(u64::MAX),
                slowest_nanos: AtomicU64::new(0),
                start_time: Instant::now(),
            }),
            listeners: Vec::new(),
            stop: None,
            reporting: None,
        }
    }

    /// Records one block duration directly.
    pub fn record(&self, duration: Duration) {
        self.stats.record(duration);
    }

    /// Creates and returns a channel sender for block durations
    ///
    /// A background thread folds every received duration into the
    /// statistics until all clones of the sender are dropped.
    pub fn duration_sender(&mut self) -> Sender<Duration> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.listeners.push(self.start_duration_listener(rx));
        tx
    }

    /// Current statistics.
    pub fn snapshot(&self) -> MiningStats {
        self.stats.snapshot()
    }

    /// Starts logging progress every `interval` until [`StatsReporter::finish`].
    pub fn start_reporting(&mut self, interval: Duration) {
        if self.reporting.is_some() {
            return;
        }

        let stats = self.stats.clone();
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);
        self.stop = Some(stop_tx);

        self.reporting = Some(thread::spawn(move || {
            while let Err(RecvTimeoutError::Timeout) = stop_rx.recv_timeout(interval) {
                let snapshot = stats.snapshot();
                log::info!(
                    "Progress: {} blocks in {:.1}s | avg {:.3} ms/block",
                    snapshot.blocks,
                    stats.start_time.elapsed().as_secs_f64(),
                    snapshot.average.as_secs_f64() * 1000.0
                );
            }
        }));
    }

    /// Stops background threads and returns the final statistics
    ///
    /// Every sender returned by [`StatsReporter::duration_sender`] must have
    /// been dropped first; otherwise this waits for them.
    pub fn finish(mut self) -> MiningStats {
        for listener in self.listeners.drain(..) {
            if listener.join().is_err() {
                log::error!("Statistics listener panicked");
            }
        }

        self.stop = None;
        if let Some(reporting) = self.reporting.take() {
            if reporting.join().is_err() {
                log::error!("Statistics reporter panicked");
            }
        }

        self.stats.snapshot()
    }

    /// Starts a listener for block durations on a background thread
    fn start_duration_listener(&self, receiver: Receiver<Duration>) -> JoinHandle<()> {
        let stats = self.stats.clone();

        thread::spawn(move || {
            for duration in receiver {
                stats.record(duration);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_count_total_average_min_max() {
        let reporter = StatsReporter::new();
        for ms in [30, 10, 20] {
            reporter.record(Duration::from_millis(ms));
        }

        let stats = reporter.snapshot();
        assert_eq!(stats.blocks, 3);
        assert_eq!(stats.total, Duration::from_millis(60));
        assert_eq!(stats.average, Duration::from_millis(20));
        assert_eq!(stats.fastest, Duration::from_millis(10));
        assert_eq!(stats.slowest, Duration::from_millis(30));
    }

    #[test]
    fn empty_run_reports_zeros() {
        let stats = StatsReporter::new().finish();
        assert_eq!(stats, MiningStats::default());
    }

    #[test]
    fn finish_drains_channel_senders() {
        let mut reporter = StatsReporter::new();
        let tx = reporter.duration_sender();
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let tx = tx.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        tx.send(Duration::from_micros(100)).unwrap();
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }
        drop(tx);

        let stats = reporter.finish();
        assert_eq!(stats.blocks, 100);
        assert_eq!(stats.total, Duration::from_millis(10));
    }

    #[test]
    fn periodic_reporting_stops_on_finish() {
        let mut reporter = StatsReporter::new();
        reporter.start_reporting(Duration::from_millis(5));
        reporter.record(Duration::from_millis(1));
        thread::sleep(Duration::from_millis(20));
        assert_eq!(reporter.finish().blocks, 1);
    }

    #[test]
    fn summary_table_uses_milliseconds() {
        let stats = MiningStats {
            blocks: 2,
            total: Duration::from_millis(3),
            average: Duration::from_micros(1500),
            fastest: Duration::from_millis(1),
            slowest: Duration::from_millis(2),
        };
        let table = stats.to_string();
        assert!(table.contains("Number of blocks added:"));
        assert!(table.contains("1.5000 ms."));
        assert!(table.lines().count() == 6);
    }
}
