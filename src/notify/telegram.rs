//! Telegram bot notifications.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{ChangeEvent, ChannelError, MessageTemplate, NotificationChannel};
use crate::config::defaults;
use crate::transport::{HttpClient, HttpRequest};

/// Sends one chat message per change through the Telegram Bot API.
///
/// POSTs `{"chat_id": ..., "text": ...}` to `<api_base>/bot<token>/sendMessage`.
/// The token is part of the URL, so neither the URL nor the token appear in
/// `Debug` output or logs.
pub struct TelegramChannel<H> {
    client: H,
    endpoint: Url,
    chat_id: String,
    text: MessageTemplate,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
}

/// The part of a Bot API reply we care about.
#[derive(Deserialize)]
struct ApiReply {
    ok: bool,
}

impl<H> TelegramChannel<H> {
    /// Creates a channel posting to `chat_id` with the default message text.
    ///
    /// # Errors
    ///
    /// Returns an error if the token produces an invalid URL.
    pub fn new(
        client: H,
        api_base: &Url,
        bot_token: &str,
        chat_id: impl Into<String>,
    ) -> Result<Self, url::ParseError> {
        let base = api_base.as_str().trim_end_matches('/');
        let endpoint = Url::parse(&format!("{base}/bot{bot_token}/sendMessage"))?;

        Ok(Self {
            client,
            endpoint,
            chat_id: chat_id.into(),
            text: MessageTemplate::new(defaults::TELEGRAM_TEXT),
        })
    }

    /// Sets the message template.
    #[must_use]
    pub fn with_text(mut self, text: MessageTemplate) -> Self {
        self.text = text;
        self
    }

    /// Returns the target chat.
    #[must_use]
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }
}

impl<H> fmt::Debug for TelegramChannel<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramChannel")
            .field("host", &self.endpoint.host_str())
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<H: HttpClient> NotificationChannel for TelegramChannel<H> {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, event: &ChangeEvent) -> Result<(), ChannelError> {
        let message = SendMessage {
            chat_id: &self.chat_id,
            text: self.text.render(event)?,
        };
        let request = HttpRequest::post(self.endpoint.clone()).with_json(&message)?;

        // Strip the URL from transport errors: it embeds the bot token.
        let response = self.client.request(request).await.map_err(redact)?;

        let refused = serde_json::from_slice::<ApiReply>(&response.body).is_ok_and(|r| !r.ok);
        if !response.is_success() || refused {
            return Err(ChannelError::Rejected {
                status: response.status,
                body: response.body_text().map(ToString::to_string),
            });
        }

        Ok(())
    }
}

fn redact(error: crate::transport::HttpError) -> crate::transport::HttpError {
    use crate::transport::HttpError;

    match error {
        HttpError::Connection(_) => HttpError::Connection("connection to Telegram failed".into()),
        HttpError::InvalidUrl(_) => HttpError::InvalidUrl("Telegram endpoint".to_string()),
        HttpError::Timeout => HttpError::Timeout,
    }
}
