// src/config/config.rs
use crate::chain::hasher::HASH_HEX_LEN;
use crate::utils::error::MinerError;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Worker count used when none (or an unusable one) is configured.
pub const DEFAULT_WORKER_THREADS: usize = 2;

/// Main configuration structure for the mining application
///
/// Difficulty is fixed for the lifetime of the process and applies to every
/// block, genesis included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Required count of leading hex `0` digits in every block hash
    /// (default: 2)
    #[serde(default = "default_difficulty")]
    pub difficulty: usize,

    /// Number of persistent worker threads
    /// (default: 2; zero, negative or non-numeric values also fall back to 2)
    #[serde(
        default = "default_worker_threads",
        deserialize_with = "lenient_worker_threads"
    )]
    pub worker_threads: usize,

    /// Seconds between progress log lines; 0 disables them
    #[serde(default)]
    pub report_interval_secs: u64,
}

fn default_difficulty() -> usize {
    2
}

fn default_worker_threads() -> usize {
    DEFAULT_WORKER_THREADS
}

// Any TOML value is accepted; unusable ones resolve to the default.
fn lenient_worker_threads<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = toml::Value::deserialize(deserializer)?;
    let text = match &raw {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    Ok(parse_worker_count(Some(&text)))
}

impl Default for Config {
    fn default() -> Self {
        Config {
            difficulty: default_difficulty(),
            worker_threads: default_worker_threads(),
            report_interval_secs: 0,
        }
    }
}

impl Config {
    /// Loads configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded and validated configuration
    /// * `Err(MinerError)` - If the file couldn't be read, parsed or validated
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, MinerError> {
        let path = path.into();
        let config_str = std::fs::read_to_string(&path).map_err(|e| {
            MinerError::ConfigError(format!(
                "Failed to read config at {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml(&config_str)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self, MinerError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that a hash can satisfy the difficulty at all.
    pub fn validate(&self) -> Result<(), MinerError> {
        if self.difficulty > HASH_HEX_LEN {
            return Err(MinerError::ConfigError(format!(
                "difficulty {} exceeds the {} hex digits of a block hash",
                self.difficulty, HASH_HEX_LEN
            )));
        }
        if self.worker_threads == 0 {
            return Err(MinerError::ConfigError(
                "worker_threads must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Generates a configuration template string
    ///
    /// # Returns
    /// String containing a commented TOML configuration template
    pub fn generate_template() -> String {
        let mut template = String::new();
        template.push_str("# Chain Miner Configuration\n\n");
        template.push_str("# Leading hex zeros required in every block hash (0-64)\n");
        template.push_str("difficulty = 2\n");
        template.push_str("# Number of persistent worker threads (invalid values fall back to 2)\n");
        template.push_str("worker_threads = 2\n");
        template.push_str("# Seconds between progress log lines (0 = disabled)\n");
        template.push_str("report_interval_secs = 0\n");
        template
    }
}

/// Resolves a raw worker-count parameter
///
/// Absent, unparsable, zero or negative values fall back to
/// [`DEFAULT_WORKER_THREADS`]; this is tolerated, not an error.
pub fn parse_worker_count(raw: Option<&str>) -> usize {
    let Some(raw) = raw else {
        return DEFAULT_WORKER_THREADS;
    };

    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 => usize::try_from(n).unwrap_or(DEFAULT_WORKER_THREADS),
        _ => {
            log::warn!(
                "Invalid worker count {:?}, using {}",
                raw,
                DEFAULT_WORKER_THREADS
            );
            DEFAULT_WORKER_THREADS
        }
    }
}
