//! Email notifications through a transactional email HTTP API.

use std::fmt;

use async_trait::async_trait;
use http::HeaderValue;
use http::header::{AUTHORIZATION, InvalidHeaderValue};
use serde::Serialize;
use url::Url;

use super::{ChangeEvent, ChannelError, MessageTemplate, NotificationChannel};
use crate::config::defaults;
use crate::transport::{HttpClient, HttpRequest};

/// Sends one email per change by POSTing to a transactional email API.
///
/// Request body: `{"from": ..., "to": ..., "subject": ..., "text": ...}`,
/// authenticated with `Authorization: Bearer <api_key>`.
pub struct EmailChannel<H> {
    client: H,
    endpoint: Url,
    authorization: HeaderValue,
    from: String,
    to: String,
    subject: MessageTemplate,
    body: MessageTemplate,
}

#[derive(Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: String,
    text: String,
}

impl<H> EmailChannel<H> {
    /// Creates an email channel with the default subject and body.
    ///
    /// # Errors
    ///
    /// Returns an error if `api_key` cannot be used in an HTTP header.
    pub fn new(
        client: H,
        endpoint: Url,
        api_key: &str,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Result<Self, InvalidHeaderValue> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {api_key}"))?;
        authorization.set_sensitive(true);

        Ok(Self {
            client,
            endpoint,
            authorization,
            from: from.into(),
            to: to.into(),
            subject: MessageTemplate::new(defaults::EMAIL_SUBJECT),
            body: MessageTemplate::new(defaults::EMAIL_BODY),
        })
    }

    /// Sets the subject template.
    #[must_use]
    pub fn with_subject(mut self, subject: MessageTemplate) -> Self {
        self.subject = subject;
        self
    }

    /// Sets the body template.
    #[must_use]
    pub fn with_body(mut self, body: MessageTemplate) -> Self {
        self.body = body;
        self
    }

    /// Returns the recipient address.
    #[must_use]
    pub fn recipient(&self) -> &str {
        &self.to
    }
}

impl<H> fmt::Debug for EmailChannel<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailChannel")
            .field("endpoint", &self.endpoint.as_str())
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<H: HttpClient> NotificationChannel for EmailChannel<H> {
    fn name(&self) -> &str {
        "email"
    }

    async fn send(&self, event: &ChangeEvent) -> Result<(), ChannelError> {
        let payload = EmailPayload {
            from: &self.from,
            to: &self.to,
            subject: self.subject.render(event)?,
            text: self.body.render(event)?,
        };

        let request = HttpRequest::post(self.endpoint.clone())
            .with_json(&payload)?
            .with_header(AUTHORIZATION, self.authorization.clone());

        let response = self.client.request(request).await?;
        if !response.is_success() {
            return Err(ChannelError::Rejected {
                status: response.status,
                body: response.body_text().map(ToString::to_string),
            });
        }

        Ok(())
    }
}
