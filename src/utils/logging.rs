//! Logging configuration and utilities
//!
//! Uses `env_logger` with a compact custom format. Output goes to stderr so
//! the run summary printed on stdout can be piped on its own.

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;

/// Initializes the logging subsystem
///
/// # Configuration
/// - Default log level: Info, or Debug when `verbose` is set
/// - `RUST_LOG` takes precedence when present
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    with_env_override(common_log_config(), level).init();
}

/// Configures benchmark-specific logging
///
/// Defaults to Debug so per-thread hashrate lines are visible.
pub fn init_bench_logging() {
    with_env_override(common_log_config(), LevelFilter::Debug).init();
}

fn with_env_override(mut builder: Builder, default: LevelFilter) -> Builder {
    if env::var("RUST_LOG").is_err() {
        builder.filter_level(default);
    } else {
        builder.parse_env("RUST_LOG");
    }
    builder
}

/// Creates a base logger builder with common settings
///
/// Format: `[timestamp LEVEL module:line] message`
fn common_log_config() -> Builder {
    let mut builder = Builder::new();

    builder
        .format(|buf, record| {
            use std::io::Write;
            let ts = buf.timestamp_millis();
            let level = record.level();
            let module = record.module_path().unwrap_or_default();
            let line = record.line().unwrap_or(0);

            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                ts,
                level,
                module,
                line,
                record.args()
            )
        })
        .target(Target::Stderr);

    builder
}
