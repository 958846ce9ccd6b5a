//! HTTP implementation of [`ValueProbe`].

use std::time::Duration;

use url::Url;

use super::{ProbeError, ValueProbe};
use crate::transport::{HttpClient, HttpRequest};

/// Probe that issues `GET <url>` and returns the bare text body.
///
/// The body is returned exactly as received; comparison against history is
/// byte-exact, so no trimming happens here.
///
/// # Example
///
/// ```
/// use ipwatch::probe::HttpProbe;
/// use ipwatch::transport::ReqwestClient;
/// use std::time::Duration;
/// use url::Url;
///
/// let probe = HttpProbe::new(
///     ReqwestClient::new(),
///     Url::parse("https://api.ipify.org").unwrap(),
/// )
/// .with_timeout(Duration::from_secs(5));
/// assert_eq!(probe.timeout(), Duration::from_secs(5));
/// ```
#[derive(Debug)]
pub struct HttpProbe<H> {
    client: H,
    url: Url,
    timeout: Duration,
}

impl<H> HttpProbe<H> {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a probe for `url` with the default timeout.
    #[must_use]
    pub const fn new(client: H, url: Url) -> Self {
        Self {
            client,
            url,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the probed endpoint.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<H: HttpClient> ValueProbe for HttpProbe<H> {
    async fn fetch(&self) -> Result<String, ProbeError> {
        let request = HttpRequest::get(self.url.clone());

        let response = tokio::time::timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))??;

        if !response.is_success() {
            return Err(ProbeError::Status {
                status: response.status,
                body: response.body_text().map(ToString::to_string),
            });
        }

        let text = String::from_utf8(response.body).map_err(|_| ProbeError::InvalidUtf8)?;
        if text.is_empty() {
            return Err(ProbeError::EmptyBody);
        }

        Ok(text)
    }
}
