use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, LogLevel};

const CRATES: &[&str] = &["trellis_core", "trellis_storage", "trellis_config", "trellis_cli", "trl"];

/// Resolve the effective level: `--log-level`, then `--verbose`, then config
pub fn resolve_level(cli: &Cli, configured: &str) -> LevelFilter {
    if let Some(level) = cli.log_level {
        return level.into();
    }
    if cli.verbose {
        return LogLevel::Debug.into();
    }
    configured.parse().unwrap_or(LevelFilter::WARN)
}

/// Filter that applies `level` to the trellis crates only.
///
/// `RUST_LOG` takes precedence when set.
pub fn env_filter(level: LevelFilter) -> EnvFilter {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
    }
    let directives = CRATES
        .iter()
        .map(|krate| format!("{}={}", krate, level))
        .collect::<Vec<_>>()
        .join(",");
    EnvFilter::new(directives)
}

/// Install the global subscriber. Logs go to stderr so command output stays clean.
pub fn init(level: LevelFilter) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
