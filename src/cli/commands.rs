// src/cli/commands.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Chain Miner CLI - parallel proof-of-work hash chain builder
#[derive(Parser, Debug)]
#[command(name = "chain-miner")]
#[command(version, about, long_about = None)]
pub struct Commands {
    /// The action to perform (mine a chain, run benchmarks, or generate config)
    #[command(subcommand)]
    pub action: Action,
}

/// Top-level commands for the miner application
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Mine a chain from line-oriented input
    Mine(MineOptions),

    /// Measure raw header-hash throughput
    Benchmark(BenchmarkOptions),

    /// Generate configuration file template
    Config(ConfigOptions),
}

/// Options for mining a chain
#[derive(Parser, Debug)]
pub struct MineOptions {
    /// Input file, one record per line (reads stdin when omitted)
    pub input: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of worker threads (overrides config; invalid values fall back to 2)
    #[arg(short, long)]
    pub workers: Option<String>,

    /// Leading hex zeros required in every block hash (overrides config)
    #[arg(short, long)]
    pub difficulty: Option<usize>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Options for running hashing benchmarks
#[derive(Parser, Debug)]
pub struct BenchmarkOptions {
    /// Duration of benchmark in seconds
    #[arg(short = 's', long, default_value_t = 10)]
    pub duration: u64,

    /// Number of threads to use
    #[arg(short, long, default_value_t = num_cpus::get())]
    pub threads: usize,

    /// Difficulty used to count qualifying hashes
    #[arg(short, long, default_value_t = 2)]
    pub difficulty: usize,
}

/// Options for generating configuration files
#[derive(Parser, Debug)]
pub struct ConfigOptions {
    /// Output file path
    #[arg(short, long, default_value = "miner.toml")]
    pub output: PathBuf,
}
