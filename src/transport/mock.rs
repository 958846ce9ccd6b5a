//! Scripted HTTP client for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use super::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Mock HTTP client that replays a queue of results and records every request.
///
/// Once the queue is exhausted every further call returns `200 OK` with an
/// empty body.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Option<Duration>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Self::default()
        }
    }

    pub fn ok(body: &str) -> Self {
        Self::new(vec![Ok(HttpResponse::with_status(
            http::StatusCode::OK,
            body,
        ))])
    }

    pub fn status(status: http::StatusCode, body: &str) -> Self {
        Self::new(vec![Ok(HttpResponse::with_status(status, body))])
    }

    pub fn failing(error: HttpError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Delays every response by `delay` (tokio time, so paused clocks apply).
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn captured_requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_json_body(&self) -> serde_json::Value {
        let requests = self.captured_requests();
        let body = requests
            .last()
            .and_then(|r| r.body.clone())
            .expect("no request with a body was captured");
        serde_json::from_slice(&body).unwrap()
    }
}

impl HttpClient for ScriptedClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(req);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse::with_status(http::StatusCode::OK, "")))
    }
}
