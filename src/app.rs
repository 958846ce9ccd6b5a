//! Application startup and utilities.
//!
//! This module contains exit codes, tracing setup, error hints, and the
//! output of the read-only subcommands that support the main entry point.

use ipwatch::config::{ConfigError, field};
use ipwatch::history::HistoryStore;
use ipwatch::history::query;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Application exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    /// Success (exit code 0).
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Configuration error (exit code 1) - invalid args, missing credentials, etc.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Runtime error (exit code 2) - unreadable history, API bind failure, etc.
    ///
    /// A function because `ExitCode::from()` is not `const fn`.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

/// Prints helpful hints for common configuration errors.
pub fn print_config_hint(error: &ConfigError) {
    match error {
        ConfigError::MissingRequired { field: f, .. } => {
            if *f == field::EMAIL_API_KEY || *f == field::TELEGRAM_BOT_TOKEN {
                eprintln!(
                    "\nSecrets can also be passed through EMAIL_API_KEY and TELEGRAM_BOT_TOKEN."
                );
            }
        }
        ConfigError::FileRead { .. } => {
            eprintln!("\nRun 'ipwatch init' to generate a configuration template.");
        }
        _ => {}
    }
}

/// Sets up the tracing subscriber for logging.
///
/// Logs go to stderr so subcommand output on stdout stays machine-readable.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Renders the `current` subcommand output.
///
/// An empty history renders the same "no data yet" object the read API returns.
pub fn current_json(store: &impl HistoryStore) -> Result<String, serde_json::Error> {
    match query::current_ip(store) {
        Some(current) => serde_json::to_string_pretty(&current),
        None => serde_json::to_string_pretty(&serde_json::json!({ "error": "No IP found" })),
    }
}

/// Renders the `history` subcommand output.
pub fn history_json(
    store: &impl HistoryStore,
    limit: Option<usize>,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&query::ip_history(store, limit))
}
