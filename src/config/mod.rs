//! Configuration layer for ipwatch.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values passed on the command line, or their
//!    environment variables (`IPWATCH_*`, `EMAIL_*`, `TELEGRAM_*`)
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! # Boolean Flag Semantics
//!
//! Boolean flags (`--email`, `--telegram`, `--silent-baseline`) use OR semantics:
//! - If set `true` in either CLI or TOML, the result is `true`.
//! - Once set `true` in TOML, CLI cannot override to `false` (flags only enable, not disable).
//!
//! # TOML-Only Options
//!
//! Message templates (`email.subject`, `email.body`, `telegram.text`) and
//! `telegram.api_base` are only configurable through the config file.
//!
//! # Channels
//!
//! A channel is only built when enabled. Every credential of an enabled
//! channel is required; a missing one fails startup with
//! [`ConfigError::MissingRequired`].

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod validated_tests;

pub use cli::{Cli, Command};
pub use error::{ConfigError, field};
pub use toml::{TomlConfig, default_config_template};
pub use validated::{EmailConfig, TelegramConfig, ValidatedConfig, write_default_config};
