//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration operations.
///
/// Covers errors from parsing, validation, and file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Missing required field that must be provided by CLI, environment, or config file.
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired {
        /// Name of the missing field
        field: &'static str,
        /// Hint for how to provide the value
        hint: &'static str,
    },

    /// Invalid URL provided.
    #[error("Invalid URL for {field} '{url}': {reason}")]
    InvalidUrl {
        /// Name of the field
        field: &'static str,
        /// The invalid URL string
        url: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid duration value (zero).
    #[error("Invalid duration for {field}: {reason}")]
    InvalidDuration {
        /// Name of the field
        field: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid listen address for the read API.
    #[error("Invalid listen address '{value}': {reason}")]
    InvalidListen {
        /// The invalid address
        value: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid secret that cannot be sent in a request.
    #[error("Invalid value for {field}: {reason}")]
    InvalidSecret {
        /// Name of the field
        field: &'static str,
        /// Reason for invalidity (never contains the secret itself)
        reason: String,
    },

    /// Invalid message template (Handlebars syntax error).
    #[error("Invalid template for {field}: {reason}")]
    InvalidTemplate {
        /// Name of the field
        field: &'static str,
        /// Reason for invalidity
        reason: String,
    },
}

/// Well-known field names for `MissingRequired` errors.
///
/// Use these constants for compile-time safety when matching field names.
pub mod field {
    /// The email API key.
    pub const EMAIL_API_KEY: &str = "email.api_key";
    /// The email sender address.
    pub const EMAIL_FROM: &str = "email.from";
    /// The Telegram bot token.
    pub const TELEGRAM_BOT_TOKEN: &str = "telegram.bot_token";
    /// The Telegram chat id.
    pub const TELEGRAM_CHAT_ID: &str = "telegram.chat_id";
}

impl ConfigError {
    /// Creates a `MissingRequired` error for a required field.
    #[must_use]
    pub const fn missing(field: &'static str, hint: &'static str) -> Self {
        Self::MissingRequired { field, hint }
    }
}
