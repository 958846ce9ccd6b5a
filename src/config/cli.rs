//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.
//! Most options can also be supplied through environment variables.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ipwatch: public IP change monitor
///
/// Periodically checks the public IP address, records every change,
/// and sends email and Telegram notifications when it changes.
#[derive(Debug, Parser)]
#[command(name = "ipwatch")]
#[command(version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are naturally boolean
pub struct Cli {
    /// Subcommand to run (defaults to monitoring)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file
    #[arg(long, short, global = true, env = "IPWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the history file
    #[arg(long = "history-file", global = true, env = "IPWATCH_HISTORY_FILE")]
    pub history_file: Option<PathBuf>,

    /// URL that answers with the public IP as plain text
    #[arg(long = "probe-url", env = "IPWATCH_PROBE_URL")]
    pub probe_url: Option<String>,

    /// Probe timeout in seconds
    #[arg(long = "probe-timeout")]
    pub probe_timeout: Option<u64>,

    /// Seconds between checks
    #[arg(long, env = "IPWATCH_INTERVAL")]
    pub interval: Option<u64>,

    /// Address to serve the read API on, e.g. 127.0.0.1:5000
    #[arg(long, env = "IPWATCH_LISTEN")]
    pub listen: Option<String>,

    /// Per-channel notification timeout in seconds
    #[arg(long = "notify-timeout")]
    pub notify_timeout: Option<u64>,

    /// Record the first IP without notifying
    #[arg(long = "silent-baseline")]
    pub silent_baseline: bool,

    /// Enable email notifications
    #[arg(long)]
    pub email: bool,

    /// Transactional email API endpoint
    #[arg(long = "email-api-url", env = "EMAIL_API_URL")]
    pub email_api_url: Option<String>,

    /// Transactional email API key
    #[arg(long = "email-api-key", env = "EMAIL_API_KEY", hide_env_values = true)]
    pub email_api_key: Option<String>,

    /// Sender address
    #[arg(long = "email-from", env = "EMAIL_FROM")]
    pub email_from: Option<String>,

    /// Recipient address (defaults to the sender)
    #[arg(long = "email-to", env = "EMAIL_TO")]
    pub email_to: Option<String>,

    /// Enable Telegram notifications
    #[arg(long)]
    pub telegram: bool,

    /// Telegram bot token
    #[arg(
        long = "telegram-bot-token",
        env = "TELEGRAM_BOT_TOKEN",
        hide_env_values = true
    )]
    pub telegram_bot_token: Option<String>,

    /// Telegram chat id to post to
    #[arg(long = "telegram-chat-id", env = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,

    /// Test mode - record changes without sending notifications
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for ipwatch
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "ipwatch.toml")]
        output: PathBuf,
    },

    /// Print the current and previous IP from the history file as JSON
    Current,

    /// Print the recorded IP history as JSON, most recent first
    History {
        /// Maximum number of entries to print
        #[arg(long, short)]
        limit: Option<usize>,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}
