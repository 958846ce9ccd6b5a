//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Probe configuration section
    #[serde(default)]
    pub probe: ProbeSection,

    /// Monitoring configuration
    #[serde(default)]
    pub monitor: MonitorSection,

    /// Read API configuration
    #[serde(default)]
    pub api: ApiSection,

    /// Notification dispatch configuration
    #[serde(default)]
    pub notify: NotifySection,

    /// Email channel configuration
    #[serde(default)]
    pub email: EmailSection,

    /// Telegram channel configuration
    #[serde(default)]
    pub telegram: TelegramSection,
}

/// Probe configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeSection {
    /// Endpoint answering with the public IP
    pub url: Option<String>,

    /// Request timeout in seconds
    pub timeout: Option<u64>,
}

/// Monitoring configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorSection {
    /// Seconds between checks
    pub interval: Option<u64>,

    /// Path to the history file
    pub history_file: Option<String>,

    /// Record the first IP without notifying
    #[serde(default)]
    pub silent_baseline: bool,
}

/// Read API configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSection {
    /// Socket address to listen on; the API is disabled when unset
    pub listen: Option<String>,
}

/// Notification dispatch configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotifySection {
    /// Per-channel timeout in seconds
    pub timeout: Option<u64>,
}

/// Email channel configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmailSection {
    /// Enable the channel
    #[serde(default)]
    pub enabled: bool,

    /// Transactional email API endpoint
    pub api_url: Option<String>,

    /// API key sent as a bearer token
    pub api_key: Option<String>,

    /// Sender address
    pub from: Option<String>,

    /// Recipient address
    pub to: Option<String>,

    /// Handlebars subject template
    pub subject: Option<String>,

    /// Handlebars body template
    pub body: Option<String>,
}

/// Telegram channel configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramSection {
    /// Enable the channel
    #[serde(default)]
    pub enabled: bool,

    /// Bot token
    pub bot_token: Option<String>,

    /// Chat to post to
    pub chat_id: Option<String>,

    /// Bot API base URL
    pub api_base: Option<String>,

    /// Handlebars message template
    pub text: Option<String>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# ipwatch Configuration File
#
# Every value can also be given on the command line; see `ipwatch --help`.
# Secrets are best supplied through EMAIL_API_KEY and TELEGRAM_BOT_TOKEN.

[probe]
# Endpoint that answers with the public IP as plain text
# url = "https://api.ipify.org"

# Request timeout in seconds (default: 10)
# timeout = 10

[monitor]
# Seconds between checks (default: 300)
interval = 300

# History file, one JSON record per line
# history_file = "ip_history.jsonl"

# Record the very first IP without sending notifications
# silent_baseline = false

[api]
# Serve the read API on this address (disabled when unset)
# listen = "127.0.0.1:5000"

[notify]
# Per-channel notification timeout in seconds (default: 10)
# timeout = 10

[email]
# enabled = true
# api_url = "https://api.resend.com/emails"
# api_key = "re_..."
# from = "monitor@example.com"
# to = "you@example.com"

# Handlebars templates
# Available variables: {{ip}}, {{previous_ip}}, {{timestamp}}
# subject = "🚨 IP Address Changed!"
# body = "Your new public IP is: {{ip}}"

[telegram]
# enabled = true
# bot_token = "123456:ABC..."
# chat_id = "123456789"
# api_base = "https://api.telegram.org"

# Handlebars template
# Available variables: {{ip}}, {{previous_ip}}, {{timestamp}}
# text = "🚨 IP Address Changed! New IP: {{ip}}"
"#
    .to_string()
}
