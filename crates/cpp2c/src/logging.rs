//! Logging configuration for the cpp2c driver.
//!
//! Library crates log through the `log` facade; this module installs the
//! `env_logger` backend exactly once.
//!
//! # Log Levels
//!
//! - `warn!` - meta-function dispatch failures
//! - `info!` - per-file summary
//! - `debug!` - each meta-function applied, each generated fragment compiled
//!
//! # Environment Variable
//!
//! `RUST_LOG` controls logging when `--verbose` is not given:
//!
//! ```bash
//! RUST_LOG=debug cpp2c check shapes.cpp2
//! RUST_LOG=cpp2_meta=debug cpp2c check shapes.cpp2
//! ```

use std::io::Write;
use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

/// Initialize logging at the default level (Warn).
///
/// Only the first initialization takes effect.
pub fn init() {
    init_with_level(LevelFilter::Warn);
}

/// Initialize logging at a fixed level, ignoring `RUST_LOG`.
pub fn init_with_level(level: LevelFilter) {
    INIT.call_once(|| {
        Builder::new()
            .filter_level(level)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{:5}] {} - {}",
                    record.level(),
                    record.target(),
                    record.args()
                )
            })
            .init();
    });
}

/// Initialize logging from `RUST_LOG`, defaulting to Warn.
pub fn init_from_env() {
    INIT.call_once(|| {
        Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    });
}

/// Initialize logging for tests; safe to call any number of times.
#[cfg(test)]
pub fn init_test() {
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Warn)
        .is_test(true)
        .try_init();
}

/// Whether [`init`], [`init_with_level`] or [`init_from_env`] ran.
pub fn is_initialized() -> bool {
    INIT.is_completed()
}
