//! Recording transport used by controller tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{ApiRequest, ApiResponse, HttpTransport, Method};
use crate::errors::ClientError;

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
    pub fail: bool,
}

impl MockResponse {
    pub fn json(body: serde_json::Value) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: None,
            fail: false,
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: None,
            fail: false,
        }
    }

    /// A connection-level failure (no response at all).
    pub fn network_failure() -> Self {
        Self {
            status: 0,
            body: String::new(),
            delay: None,
            fail: true,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Responses are queued per (method, path). The last queued response for a
/// route keeps answering once the queue is down to one entry.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), Vec<MockResponse>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self, method: Method, path: &str, response: MockResponse) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push(response);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    fn next_response(&self, method: Method, path: &str) -> Option<MockResponse> {
        let mut routes = self.routes.lock().unwrap();
        let queue = routes.get_mut(&(method, path.to_string()))?;
        if queue.len() > 1 {
            Some(queue.remove(0))
        } else {
            queue.first().cloned()
        }
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let method = request.method;
        let path = request.path.clone();
        self.requests.lock().unwrap().push(request);

        let response = self
            .next_response(method, &path)
            .ok_or_else(|| ClientError::Transport(format!("no mock route for {path}")))?;

        if let Some(delay) = response.delay {
            tokio::time::sleep(delay).await;
        }

        if response.fail {
            return Err(ClientError::Transport("connection reset".to_string()));
        }

        Ok(ApiResponse {
            status: response.status,
            body: response.body,
        })
    }
}
