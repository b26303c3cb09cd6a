// src/main.rs
use chain_miner_rs::{self, *};
use clap::Parser;
use rayon::prelude::*;
use std::time::{Duration, Instant};

/// Main entry point for the chain miner
///
/// # Flow
/// 1. Parses command line arguments
/// 2. Delegates to appropriate subcommand handler
/// 3. Propagates any errors upward
fn main() -> Result<(), MinerError> {
    let cli = cli::Commands::parse();

    match cli.action {
        cli::Action::Mine(opts) => mine_chain(opts),
        cli::Action::Benchmark(opts) => run_benchmark(opts),
        cli::Action::Config(opts) => generate_config(opts),
    }
}

/// Mines a chain from the input records and prints the timing summary
///
/// # Operations
/// 1. Initializes logging
/// 2. Loads configuration and applies CLI overrides
/// 3. Reads the input records
/// 4. Runs the coordinator and its worker pool
/// 5. Prints block statistics to stdout
fn mine_chain(opts: cli::MineOptions) -> Result<(), MinerError> {
    utils::init_logging(opts.verbose);

    let mut config = match &opts.config {
        Some(path) => config::load(path)?,
        None => Config::default(),
    };
    // Apply CLI overrides
    if opts.workers.is_some() {
        config.worker_threads = config::parse_worker_count(opts.workers.as_deref());
    }
    if let Some(difficulty) = opts.difficulty {
        config.difficulty = difficulty;
    }
    config.validate()?;

    let records = input::open(opts.input.as_deref())?;
    log::info!(
        "Mining {} records with {} workers at difficulty {}",
        records.len(),
        config.worker_threads,
        config.difficulty
    );

    let mut reporter = StatsReporter::new();
    if config.report_interval_secs > 0 {
        reporter.start_reporting(Duration::from_secs(config.report_interval_secs));
    }

    let mut coordinator =
        Coordinator::from_config(&config)?.with_duration_sender(reporter.duration_sender());
    let mined = coordinator.run(records);
    let chain = coordinator.into_chain()?;
    mined?;

    if !chain.verify() {
        return Err(MinerError::ChainError(
            "mined chain failed verification".into(),
        ));
    }
    if let Some(tip) = chain.tip() {
        log::info!("Tip hash: {}", tip.hash());
    }

    let stats = reporter.finish();
    println!("{}", stats);
    Ok(())
}

/// Measures raw header-hash throughput
///
/// Each thread hashes a fixed header over its own stride of the nonce space
/// until the deadline, counting hashes that would meet `opts.difficulty`.
fn run_benchmark(opts: cli::BenchmarkOptions) -> Result<(), MinerError> {
    utils::init_bench_logging();

    let threads = opts.threads.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| MinerError::WorkerError(format!("Failed to build thread pool: {}", e)))?;

    log::info!(
        "Starting hashing benchmark on {} threads for {} seconds",
        threads,
        opts.duration
    );

    let block = Block::new("benchmark", "", 0);
    let start_time = Instant::now();
    let deadline = Duration::from_secs(opts.duration);

    let (hashes, hits) = pool.install(|| {
        (0..threads)
            .into_par_iter()
            .map(|lane| {
                let mut nonce = lane as u64;
                let mut hashes = 0u64;
                let mut hits = 0u64;
                let mut last_log = Instant::now();

                while start_time.elapsed() < deadline {
                    if meets_difficulty(&block.hash_with_nonce(nonce), opts.difficulty) {
                        hits += 1;
                    }
                    nonce += threads as u64;
                    hashes += 1;

                    // Log progress every second
                    if last_log.elapsed().as_secs() >= 1 {
                        log::debug!(
                            "Lane {}: {} hashes so far",
                            lane,
                            hashes
                        );
                        last_log = Instant::now();
                    }
                }
                (hashes, hits)
            })
            .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1))
    });

    let elapsed = start_time.elapsed().as_secs_f64().max(f64::EPSILON);
    log::info!("Benchmark results:");
    log::info!("Total hashes: {}", hashes);
    log::info!("Hashes meeting difficulty {}: {}", opts.difficulty, hits);
    log::info!("Average hashrate: {:.2} H/s", hashes as f64 / elapsed);
    log::logger().flush();

    Ok(())
}

/// Writes the configuration template to the requested file
fn generate_config(opts: cli::ConfigOptions) -> Result<(), MinerError> {
    std::fs::write(&opts.output, config::generate_template())?;
    println!("Wrote configuration template to {}", opts.output.display());
    Ok(())
}
