//! reqwest-backed [`HttpClient`].

use super::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// The production [`HttpClient`].
///
/// Clones share one connection pool: build it once at startup and hand a
/// clone to the probe and to each channel.
///
/// # Example
///
/// ```no_run
/// use ipwatch::transport::{HttpClient, HttpRequest, ReqwestClient};
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let reply = ReqwestClient::new()
///     .request(HttpRequest::get(Url::parse("https://api.ipify.org")?))
///     .await?;
/// println!("{}", reply.body_text().unwrap_or_default());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a client with reqwest's defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a preconfigured reqwest client.
    #[must_use]
    pub const fn from_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

impl HttpClient for ReqwestClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = req;

        let mut builder = self.inner.request(method, url.as_str()).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(classify)?;

        Ok(HttpResponse::new(status, headers, body.to_vec()))
    }
}

/// Maps a reqwest failure onto the transport error taxonomy.
fn classify(error: reqwest::Error) -> HttpError {
    if error.is_timeout() {
        HttpError::Timeout
    } else if error.is_builder() {
        HttpError::InvalidUrl(error.to_string())
    } else {
        HttpError::Connection(Box::new(error))
    }
}
