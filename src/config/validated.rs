//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use http::HeaderValue;
use url::Url;

use crate::notify::MessageTemplate;

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::{EmailSection, TelegramSection, TomlConfig};

/// Fully validated configuration ready for use by the application.
///
/// This struct represents a complete, validated configuration where all
/// required fields are present and all values have been validated.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Endpoint answering with the public IP
    pub probe_url: Url,

    /// Probe request timeout
    pub probe_timeout: Duration,

    /// Time between cycle starts
    pub interval: Duration,

    /// History file path
    pub history_file: PathBuf,

    /// Record the first observation without notifying
    pub silent_baseline: bool,

    /// Read API address; `None` disables the API
    pub listen: Option<SocketAddr>,

    /// Per-channel notification timeout
    pub notify_timeout: Duration,

    /// Email channel, when enabled
    pub email: Option<EmailConfig>,

    /// Telegram channel, when enabled
    pub telegram: Option<TelegramConfig>,

    /// Dry-run mode (record changes without notifying)
    pub dry_run: bool,

    /// Verbose logging enabled
    pub verbose: bool,
}

/// Settings for the email channel.
pub struct EmailConfig {
    /// API endpoint
    pub api_url: Url,
    /// API key; never printed
    pub api_key: String,
    /// Sender address
    pub from: String,
    /// Recipient address
    pub to: String,
    /// Subject template
    pub subject: MessageTemplate,
    /// Body template
    pub body: MessageTemplate,
}

/// Settings for the Telegram channel.
pub struct TelegramConfig {
    /// Bot API base URL
    pub api_base: Url,
    /// Bot token; never printed
    pub bot_token: String,
    /// Target chat
    pub chat_id: String,
    /// Message template
    pub text: MessageTemplate,
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_key", &"<redacted>")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("subject", &self.subject.source())
            .field("body", &self.body.source())
            .finish()
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_base", &self.api_base.as_str())
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("text", &self.text.source())
            .finish()
    }
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listen = self
            .listen
            .map_or_else(|| "disabled".to_string(), |addr| addr.to_string());
        let email = self
            .email
            .as_ref()
            .map_or_else(|| "disabled".to_string(), |e| format!("to {}", e.to));
        let telegram = self
            .telegram
            .as_ref()
            .map_or_else(|| "disabled".to_string(), |t| format!("chat {}", t.chat_id));

        write!(
            f,
            "Config {{ probe: {}, interval: {}s, history_file: {}, api: {}, email: {}, \
             telegram: {}, notify_timeout: {}s, silent_baseline: {}, dry_run: {} }}",
            self.probe_url,
            self.interval.as_secs(),
            self.history_file.display(),
            listen,
            email,
            telegram,
            self.notify_timeout.as_secs(),
            self.silent_baseline,
            self.dry_run,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments (and their environment variables) take precedence over TOML
    /// config values, which take precedence over built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A URL is invalid
    /// - A duration is zero
    /// - The listen address does not parse
    /// - A template does not compile
    /// - An enabled channel is missing a credential
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let probe_url = parse_url(
            "probe.url",
            cli.probe_url
                .as_deref()
                .or_else(|| toml.and_then(|t| t.probe.url.as_deref()))
                .unwrap_or(defaults::PROBE_URL),
        )?;

        let probe_timeout = resolve_duration(
            "probe.timeout",
            cli.probe_timeout,
            toml.and_then(|t| t.probe.timeout),
            defaults::PROBE_TIMEOUT_SECS,
        )?;

        let interval = resolve_duration(
            "monitor.interval",
            cli.interval,
            toml.and_then(|t| t.monitor.interval),
            defaults::INTERVAL_SECS,
        )?;

        let notify_timeout = resolve_duration(
            "notify.timeout",
            cli.notify_timeout,
            toml.and_then(|t| t.notify.timeout),
            defaults::NOTIFY_TIMEOUT_SECS,
        )?;

        let listen = Self::resolve_listen(cli, toml)?;

        // Flags only enable, never disable
        let silent_baseline =
            cli.silent_baseline || toml.is_some_and(|t| t.monitor.silent_baseline);

        let email = Self::build_email(cli, toml.map(|t| &t.email))?;
        let telegram = Self::build_telegram(cli, toml.map(|t| &t.telegram))?;

        Ok(Self {
            probe_url,
            probe_timeout,
            interval,
            history_file: Self::resolve_history_file(cli, toml),
            silent_baseline,
            listen,
            notify_timeout,
            email,
            telegram,
            dry_run: cli.dry_run,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = load_toml(cli)?;
        Self::from_raw(cli, toml.as_ref())
    }

    /// Resolves only the history file path, for the read-only subcommands.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn history_path(cli: &Cli) -> Result<PathBuf, ConfigError> {
        let toml = load_toml(cli)?;
        Ok(Self::resolve_history_file(cli, toml.as_ref()))
    }

    /// Returns the number of enabled notification channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        usize::from(self.email.is_some()) + usize::from(self.telegram.is_some())
    }

    fn resolve_history_file(cli: &Cli, toml: Option<&TomlConfig>) -> PathBuf {
        cli.history_file.clone().unwrap_or_else(|| {
            PathBuf::from(
                toml.and_then(|t| t.monitor.history_file.as_deref())
                    .unwrap_or(defaults::HISTORY_FILE),
            )
        })
    }

    fn resolve_listen(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Option<SocketAddr>, ConfigError> {
        let Some(value) = cli
            .listen
            .as_deref()
            .or_else(|| toml.and_then(|t| t.api.listen.as_deref()))
        else {
            return Ok(None);
        };

        value
            .parse::<SocketAddr>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidListen {
                value: value.to_string(),
                reason: e.to_string(),
            })
    }

    fn build_email(
        cli: &Cli,
        section: Option<&EmailSection>,
    ) -> Result<Option<EmailConfig>, ConfigError> {
        if !(cli.email || section.is_some_and(|s| s.enabled)) {
            return Ok(None);
        }

        let api_key = present(
            cli.email_api_key.as_deref(),
            section.and_then(|s| s.api_key.as_deref()),
        )
        .ok_or_else(|| {
            ConfigError::missing(
                field::EMAIL_API_KEY,
                "Use --email-api-key, EMAIL_API_KEY, or set email.api_key in config file",
            )
        })?;

        if HeaderValue::from_str(&format!("Bearer {api_key}")).is_err() {
            return Err(ConfigError::InvalidSecret {
                field: field::EMAIL_API_KEY,
                reason: "contains characters not allowed in an HTTP header".to_string(),
            });
        }

        let from = present(
            cli.email_from.as_deref(),
            section.and_then(|s| s.from.as_deref()),
        )
        .ok_or_else(|| {
            ConfigError::missing(
                field::EMAIL_FROM,
                "Use --email-from, EMAIL_FROM, or set email.from in config file",
            )
        })?;

        // Alerts go to the sender when no recipient is given
        let to = present(
            cli.email_to.as_deref(),
            section.and_then(|s| s.to.as_deref()),
        )
        .unwrap_or(from);

        let api_url = parse_url(
            "email.api_url",
            cli.email_api_url
                .as_deref()
                .or_else(|| section.and_then(|s| s.api_url.as_deref()))
                .unwrap_or(defaults::EMAIL_API_URL),
        )?;

        Ok(Some(EmailConfig {
            api_url,
            api_key: api_key.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            subject: parse_template(
                "email.subject",
                section.and_then(|s| s.subject.as_deref()),
                defaults::EMAIL_SUBJECT,
            )?,
            body: parse_template(
                "email.body",
                section.and_then(|s| s.body.as_deref()),
                defaults::EMAIL_BODY,
            )?,
        }))
    }

    fn build_telegram(
        cli: &Cli,
        section: Option<&TelegramSection>,
    ) -> Result<Option<TelegramConfig>, ConfigError> {
        if !(cli.telegram || section.is_some_and(|s| s.enabled)) {
            return Ok(None);
        }

        let bot_token = present(
            cli.telegram_bot_token.as_deref(),
            section.and_then(|s| s.bot_token.as_deref()),
        )
        .ok_or_else(|| {
            ConfigError::missing(
                field::TELEGRAM_BOT_TOKEN,
                "Use --telegram-bot-token, TELEGRAM_BOT_TOKEN, or set telegram.bot_token in config file",
            )
        })?;

        if bot_token.contains(|c: char| c == '/' || c.is_whitespace()) {
            return Err(ConfigError::InvalidSecret {
                field: field::TELEGRAM_BOT_TOKEN,
                reason: "must not contain '/' or whitespace".to_string(),
            });
        }

        let chat_id = present(
            cli.telegram_chat_id.as_deref(),
            section.and_then(|s| s.chat_id.as_deref()),
        )
        .ok_or_else(|| {
            ConfigError::missing(
                field::TELEGRAM_CHAT_ID,
                "Use --telegram-chat-id, TELEGRAM_CHAT_ID, or set telegram.chat_id in config file",
            )
        })?;

        let api_base = parse_url(
            "telegram.api_base",
            section
                .and_then(|s| s.api_base.as_deref())
                .unwrap_or(defaults::TELEGRAM_API_BASE),
        )?;

        Ok(Some(TelegramConfig {
            api_base,
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
            text: parse_template(
                "telegram.text",
                section.and_then(|s| s.text.as_deref()),
                defaults::TELEGRAM_TEXT,
            )?,
        }))
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// Helper functions

fn load_toml(cli: &Cli) -> Result<Option<TomlConfig>, ConfigError> {
    cli.config.as_deref().map(TomlConfig::load).transpose()
}

/// First non-empty value; an empty environment variable counts as unset.
fn present<'a>(cli: Option<&'a str>, toml: Option<&'a str>) -> Option<&'a str> {
    cli.filter(|v| !v.is_empty())
        .or_else(|| toml.filter(|v| !v.is_empty()))
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        field,
        url: value.to_string(),
        reason: e.to_string(),
    })
}

fn resolve_duration(
    field: &'static str,
    cli: Option<u64>,
    toml: Option<u64>,
    default: u64,
) -> Result<Duration, ConfigError> {
    // Priority: CLI explicit > TOML > default
    let seconds = cli.or(toml).unwrap_or(default);

    if seconds == 0 {
        return Err(ConfigError::InvalidDuration {
            field,
            reason: "must be greater than 0".to_string(),
        });
    }

    Ok(Duration::from_secs(seconds))
}

fn parse_template(
    field: &'static str,
    value: Option<&str>,
    default: &str,
) -> Result<MessageTemplate, ConfigError> {
    MessageTemplate::validated(value.unwrap_or(default)).map_err(|e| {
        ConfigError::InvalidTemplate {
            field,
            reason: e.to_string(),
        }
    })
}
