//! Value probe: fetches the current public address from a remote endpoint.
//!
//! The probe is a pure I/O boundary. It performs one bounded request per call
//! and never retries; the next scheduled cycle is the retry.

mod endpoint;

pub use endpoint::HttpProbe;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::transport::HttpError;

/// Error type for a failed probe.
///
/// Every variant is transient from the monitor's point of view: the cycle
/// ends without touching history and the next cycle probes again.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The request did not reach the endpoint or the response was cut off.
    #[error("Probe request failed: {0}")]
    Http(#[from] HttpError),

    /// The endpoint answered with a non-2xx status.
    #[error("Probe endpoint returned {status}")]
    Status {
        /// HTTP status code returned
        status: http::StatusCode,
        /// Response body, if it was valid UTF-8
        body: Option<String>,
    },

    /// The endpoint did not answer within the configured timeout.
    #[error("Probe timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The endpoint answered 2xx with an empty body.
    #[error("Probe endpoint returned an empty body")]
    EmptyBody,

    /// The endpoint answered 2xx with a body that is not UTF-8 text.
    #[error("Probe endpoint returned a non-UTF-8 body")]
    InvalidUtf8,
}

/// Source of the current external value.
///
/// # Example
///
/// ```ignore
/// use ipwatch::probe::{ProbeError, ValueProbe};
///
/// struct Fixed(&'static str);
///
/// impl ValueProbe for Fixed {
///     async fn fetch(&self) -> Result<String, ProbeError> {
///         Ok(self.0.to_string())
///     }
/// }
/// ```
pub trait ValueProbe: Send + Sync {
    /// Fetches the current value.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError`] on network failure, non-2xx response,
    /// timeout, or an unusable body.
    fn fetch(&self) -> impl std::future::Future<Output = Result<String, ProbeError>> + Send;
}

impl<T: ValueProbe> ValueProbe for Arc<T> {
    fn fetch(&self) -> impl std::future::Future<Output = Result<String, ProbeError>> + Send {
        (**self).fetch()
    }
}

/// Scripted probes for tests.
#[cfg(test)]
pub mod mock {
    use super::{ProbeError, ValueProbe};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Probe that replays a fixed sequence of results.
    ///
    /// When the script runs out, the last successful value is repeated.
    #[derive(Debug, Default)]
    pub struct ScriptedProbe {
        script: Mutex<VecDeque<Result<String, ProbeError>>>,
        last: Mutex<Option<String>>,
        delay: Option<Duration>,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedProbe {
        pub fn values(values: &[&str]) -> Self {
            Self::new(values.iter().map(|v| Ok((*v).to_string())).collect())
        }

        pub fn new(script: Vec<Result<String, ProbeError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                ..Self::default()
            }
        }

        pub fn failing() -> Self {
            Self::new(vec![Err(ProbeError::EmptyBody)])
        }

        /// Makes every fetch take `delay` of tokio time.
        pub const fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Highest number of fetches observed running at the same time.
        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    impl ValueProbe for ScriptedProbe {
        async fn fetch(&self) -> Result<String, ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(running, Ordering::SeqCst);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            let next = self.script.lock().unwrap().pop_front();
            let result = match next {
                Some(Ok(value)) => {
                    *self.last.lock().unwrap() = Some(value.clone());
                    Ok(value)
                }
                Some(Err(e)) => Err(e),
                None => self.last.lock().unwrap().clone().ok_or(ProbeError::EmptyBody),
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }
}
