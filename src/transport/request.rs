//! Request and response values plus the [`HttpClient`] seam.

use std::future::Future;

use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use serde::Serialize;
use url::Url;

use super::HttpError;

/// An outbound request, built by the probe or a channel.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Target URL
    pub url: Url,
    /// Headers to send
    pub headers: HeaderMap,
    /// Encoded body, if any
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Creates a request with no headers and no body.
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Shorthand for a `GET` request.
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Shorthand for a `POST` request.
    #[must_use]
    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    /// Encodes `payload` as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if `payload` has no JSON form.
    pub fn with_json<T: Serialize>(mut self, payload: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_vec(payload)?);
        Ok(self.with_header(CONTENT_TYPE, HeaderValue::from_static("application/json")))
    }

    /// Appends a header; repeated names keep every value.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response from its parts.
    #[must_use]
    pub const fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Creates a header-less response.
    #[must_use]
    pub fn with_status(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, HeaderMap::new(), body.into())
    }

    /// `true` for 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The body as text, or `None` if it is not UTF-8.
    #[must_use]
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

/// Sends [`HttpRequest`]s.
///
/// The probe and the channels only see this trait, so tests swap in a
/// scripted client and production uses [`ReqwestClient`](super::ReqwestClient).
///
/// # Example
///
/// ```ignore
/// use ipwatch::transport::{HttpClient, HttpError, HttpRequest, HttpResponse};
///
/// struct Canned(HttpResponse);
///
/// impl HttpClient for Canned {
///     async fn request(&self, _req: HttpRequest) -> Result<HttpResponse, HttpError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
pub trait HttpClient: Send + Sync {
    /// Sends `req` and buffers the whole response.
    ///
    /// Every status code counts as a transport success; callers decide what
    /// a non-2xx answer means for them.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request cannot be built, the connection
    /// fails, or the client's own timeout fires.
    fn request(
        &self,
        req: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send;
}
