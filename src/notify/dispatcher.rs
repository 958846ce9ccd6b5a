//! Fan-out of one event to every configured channel.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::{ChangeEvent, ChannelError, NotificationChannel};

/// Result of delivering one event through one channel.
#[derive(Debug)]
pub struct ChannelOutcome {
    /// Channel name
    pub channel: String,
    /// Delivery result
    pub result: Result<(), ChannelError>,
}

/// Per-channel results of one dispatch, in registration order.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// One entry per channel
    pub outcomes: Vec<ChannelOutcome>,
}

impl DispatchReport {
    /// Number of channels that accepted the message.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Names of the channels that failed.
    #[must_use]
    pub fn failed(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_err())
            .map(|o| o.channel.as_str())
            .collect()
    }

    /// Returns `true` if every channel delivered (vacuously true with no channels).
    #[must_use]
    pub fn all_delivered(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Looks up the outcome for a channel by name.
    #[must_use]
    pub fn outcome(&self, channel: &str) -> Option<&ChannelOutcome> {
        self.outcomes.iter().find(|o| o.channel == channel)
    }
}

/// Delivers change events to a fixed set of channels.
///
/// Every channel is attempted for every event, one after another, each bounded
/// by the dispatcher's timeout. A failure is logged and recorded in the
/// [`DispatchReport`]; it is never retried and never stops the next channel.
/// Each send runs on its own task, so a panicking channel is reported as
/// [`ChannelError::Aborted`] instead of unwinding into the caller.
///
/// # Example
///
/// ```
/// use ipwatch::notify::Dispatcher;
/// use std::time::Duration;
///
/// let dispatcher = Dispatcher::new().with_timeout(Duration::from_secs(5));
/// assert!(dispatcher.is_empty());
/// ```
pub struct Dispatcher {
    channels: Vec<Arc<dyn NotificationChannel>>,
    timeout: Duration,
}

impl Dispatcher {
    /// Default per-channel timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a dispatcher with no channels.
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the per-channel timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a channel. Channels are attempted in the order they were added.
    #[must_use]
    pub fn with_channel(mut self, channel: impl NotificationChannel + 'static) -> Self {
        self.channels.push(Arc::new(channel));
        self
    }

    /// Returns the per-channel timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the number of channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Returns `true` if no channel is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Returns channel names in dispatch order.
    #[must_use]
    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Sends `event` through every channel and reports each result.
    pub async fn dispatch(&self, event: &ChangeEvent) -> DispatchReport {
        let mut outcomes = Vec::with_capacity(self.channels.len());

        for channel in &self.channels {
            let name = channel.name();
            let result = self.send_isolated(Arc::clone(channel), event.clone()).await;

            match &result {
                Ok(()) => tracing::info!("{name}: notification sent for {}", event.value),
                Err(e) => tracing::error!("{name}: notification failed: {e}"),
            }

            outcomes.push(ChannelOutcome {
                channel: name.to_string(),
                result,
            });
        }

        DispatchReport { outcomes }
    }

    async fn send_isolated(
        &self,
        channel: Arc<dyn NotificationChannel>,
        event: ChangeEvent,
    ) -> Result<(), ChannelError> {
        let timeout = self.timeout;
        let task = tokio::spawn(async move {
            tokio::time::timeout(timeout, channel.send(&event))
                .await
                .unwrap_or(Err(ChannelError::Timeout(timeout)))
        });

        task.await
            .unwrap_or_else(|e| Err(ChannelError::Aborted(e.to_string())))
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("channels", &self.channel_names())
            .field("timeout", &self.timeout)
            .finish()
    }
}
