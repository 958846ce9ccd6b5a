//! Notification fan-out.
//!
//! This module provides:
//! - The event delivered to subscribers ([`ChangeEvent`])
//! - The channel abstraction ([`NotificationChannel`]) and its errors ([`ChannelError`])
//! - The dispatcher that isolates channels from each other ([`Dispatcher`], [`DispatchReport`])
//! - Concrete channels ([`EmailChannel`], [`TelegramChannel`])
//! - Message rendering ([`MessageTemplate`])
//!
//! A failed channel is logged and reported, never retried, and never affects
//! its siblings or the history write that preceded it.

mod dispatcher;
mod email;
mod telegram;
mod template;


pub use dispatcher::{ChannelOutcome, DispatchReport, Dispatcher};
pub use email::EmailChannel;
pub use telegram::TelegramChannel;
pub use template::MessageTemplate;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::transport::HttpError;

/// A confirmed transition, as handed to every channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The newly observed value
    pub value: String,
    /// The value it replaced; `None` for the first observation ever
    pub previous: Option<String>,
    /// When the new value was recorded
    pub observed_at: DateTime<Utc>,
}

impl ChangeEvent {
    /// Returns `true` if this event established the baseline.
    #[must_use]
    pub const fn is_first(&self) -> bool {
        self.previous.is_none()
    }
}

/// Error type for a single channel delivery.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The request never got a response.
    #[error("Request failed: {0}")]
    Http(#[from] HttpError),

    /// The service answered with a non-success status.
    #[error("Service rejected the message with {status}")]
    Rejected {
        /// HTTP status code returned
        status: http::StatusCode,
        /// Response body, if it was valid UTF-8
        body: Option<String>,
    },

    /// The channel did not finish within the dispatcher's timeout.
    #[error("No response within {}s", .0.as_secs())]
    Timeout(Duration),

    /// The channel panicked while sending.
    #[error("Channel aborted: {0}")]
    Aborted(String),

    /// The message template failed to render.
    #[error("Failed to render message: {0}")]
    Template(String),

    /// The request payload could not be encoded.
    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One independent way of telling a subscriber about a change.
///
/// Object-safe so the dispatcher can hold a heterogeneous set.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Short stable name used in logs and reports (e.g. `"email"`).
    fn name(&self) -> &str;

    /// Delivers one event. Called at most once per event.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError`] if the message was not accepted.
    async fn send(&self, event: &ChangeEvent) -> Result<(), ChannelError>;
}

/// Channels for tests.
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Channel that records every event it receives, optionally failing or stalling.
    #[derive(Debug)]
    pub struct RecordingChannel {
        name: String,
        fail: bool,
        delay: Option<Duration>,
        received: Mutex<Vec<ChangeEvent>>,
    }

    impl RecordingChannel {
        pub fn succeeding(name: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                fail: false,
                delay: None,
                received: Mutex::new(Vec::new()),
            })
        }

        pub fn failing(name: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                fail: true,
                delay: None,
                received: Mutex::new(Vec::new()),
            })
        }

        pub fn stalling(name: &str, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                fail: false,
                delay: Some(delay),
                received: Mutex::new(Vec::new()),
            })
        }

        pub fn received(&self) -> Vec<ChangeEvent> {
            self.received.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationChannel for Arc<RecordingChannel> {
        fn name(&self) -> &str {
            &self.name
        }

        async fn send(&self, event: &ChangeEvent) -> Result<(), ChannelError> {
            self.received.lock().unwrap().push(event.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(ChannelError::Rejected {
                    status: http::StatusCode::BAD_GATEWAY,
                    body: None,
                });
            }
            Ok(())
        }
    }
}
