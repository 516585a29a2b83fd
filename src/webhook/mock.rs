//! Scripted HTTP client for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Mock HTTP client that replays a fixed sequence of results and
/// records every request it receives.
#[derive(Debug, Default)]
pub struct MockClient {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockClient {
    pub fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A client that answers every scripted call with the given statuses.
    pub fn with_statuses(statuses: &[u16]) -> Self {
        Self::new(statuses.iter().map(|code| Ok(status(*code, ""))).collect())
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn captured_requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Returns the `Authorization` header of every recorded request, in order.
    pub fn authorization_headers(&self) -> Vec<String> {
        self.captured_requests()
            .iter()
            .map(|req| {
                req.headers
                    .get(http::header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string()
            })
            .collect()
    }
}

impl HttpClient for MockClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(req);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("MockClient received more requests than scripted responses")
    }
}

impl HttpClient for Arc<MockClient> {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        (**self).request(req).await
    }
}

/// Builds a response with the given status code and text body.
pub fn status(code: u16, body: &str) -> HttpResponse {
    HttpResponse::new(
        http::StatusCode::from_u16(code).unwrap(),
        http::HeaderMap::new(),
        body.as_bytes().to_vec(),
    )
}

/// Builds a 200 response carrying `value` as its JSON body.
pub fn json(value: &serde_json::Value) -> HttpResponse {
    HttpResponse::new(
        http::StatusCode::OK,
        http::HeaderMap::new(),
        serde_json::to_vec(value).unwrap(),
    )
}
