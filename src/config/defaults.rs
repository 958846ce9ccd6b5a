//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Default endpoint that answers with the caller's public IP as plain text.
pub const PROBE_URL: &str = "https://api.ipify.org";

/// Default probe timeout in seconds.
pub const PROBE_TIMEOUT_SECS: u64 = 10;

/// Default time between detection cycles in seconds.
pub const INTERVAL_SECS: u64 = 300;

/// Default history file path, relative to the working directory.
pub const HISTORY_FILE: &str = "ip_history.jsonl";

/// Default per-channel notification timeout in seconds.
pub const NOTIFY_TIMEOUT_SECS: u64 = 10;

/// Default transactional email API endpoint.
pub const EMAIL_API_URL: &str = "https://api.resend.com/emails";

/// Default Telegram Bot API base URL.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Default email subject template.
pub const EMAIL_SUBJECT: &str = "🚨 IP Address Changed!";

/// Default email body template.
pub const EMAIL_BODY: &str = "Your new public IP is: {{ip}}";

/// Default Telegram message template.
pub const TELEGRAM_TEXT: &str = "🚨 IP Address Changed! New IP: {{ip}}";

/// Default probe timeout as Duration.
#[must_use]
pub const fn probe_timeout() -> Duration {
    Duration::from_secs(PROBE_TIMEOUT_SECS)
}

/// Default cycle interval as Duration.
#[must_use]
pub const fn interval() -> Duration {
    Duration::from_secs(INTERVAL_SECS)
}

/// Default notification timeout as Duration.
#[must_use]
pub const fn notify_timeout() -> Duration {
    Duration::from_secs(NOTIFY_TIMEOUT_SECS)
}
