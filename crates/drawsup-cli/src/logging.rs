//! Logging setup
//!
//! The level comes from `-v` flags unless DRAWSUP_LOG is set, in which case
//! DRAWSUP_LOG is used as the level for both crates. Logs go to stderr, or to
//! `log_file` when one is configured.

use std::fs::OpenOptions;
use std::sync::Mutex;

use drawsup_core::Config;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Level name for a number of `-v` flags
fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn filter(verbosity: u8) -> EnvFilter {
    let log_level =
        std::env::var("DRAWSUP_LOG").unwrap_or_else(|_| level_for(verbosity).to_string());
    EnvFilter::new(format!(
        "drawsup_core={},drawsup_cli={}",
        log_level, log_level
    ))
}

/// Initialize logging (ignored if a subscriber is already installed)
pub fn init(config: &Config, verbosity: u8) {
    if let Some(log_path) = &config.log_file {
        let log_file = match OpenOptions::new().create(true).append(true).open(log_path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
                return;
            }
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter(verbosity))
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(log_file))
            .try_init();

        debug!("Logging to {:?}", log_path);
        return;
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbosity))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
