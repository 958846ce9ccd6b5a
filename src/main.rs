//! ipwatch: public IP change monitor
//!
//! Entry point for the ipwatch application.

use ipwatch::config::{Cli, Command, ValidatedConfig, write_default_config};
use ipwatch::history::FileHistoryStore;
use std::process::ExitCode;

mod app;
mod run;

use app::{exit_code, print_config_hint, setup_tracing};

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match &cli.command {
        Some(Command::Init { output }) => return handle_init(output),
        Some(Command::Current) => return handle_query(&cli, app::current_json),
        Some(Command::History { limit }) => {
            let limit = *limit;
            return handle_query(&cli, |store| app::history_json(store, limit));
        }
        None => {}
    }

    // Load and validate configuration
    let config = match ValidatedConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            return exit_code::CONFIG_ERROR;
        }
    };

    // Setup logging and run
    setup_tracing(config.verbose);
    tracing::info!("{config}");

    run_application(config)
}

/// Handles the `init` subcommand.
fn handle_init(output: &std::path::Path) -> ExitCode {
    match write_default_config(output) {
        Ok(()) => {
            println!("Configuration template written to: {}", output.display());
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::CONFIG_ERROR
        }
    }
}

/// Handles the read-only `current` and `history` subcommands.
fn handle_query(
    cli: &Cli,
    render: impl FnOnce(&FileHistoryStore) -> Result<String, serde_json::Error>,
) -> ExitCode {
    let path = match ValidatedConfig::history_path(cli) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            return exit_code::CONFIG_ERROR;
        }
    };

    setup_tracing(cli.verbose);

    let output = FileHistoryStore::open(&path)
        .map_err(|e| e.to_string())
        .and_then(|store| render(&store).map_err(|e| e.to_string()));

    match output {
        Ok(json) => {
            println!("{json}");
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::runtime_error()
        }
    }
}

/// Runs the main application with the given configuration.
///
/// Excluded from coverage - requires async runtime.
#[cfg(not(tarpaulin_include))]
fn run_application(config: ValidatedConfig) -> ExitCode {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create Tokio runtime: {e}");
            return exit_code::runtime_error();
        }
    };

    match runtime.block_on(run::execute(config)) {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            tracing::error!("Application error: {e}");
            exit_code::runtime_error()
        }
    }
}
