//! HTTP seam: every backend call made by the controllers goes through
//! [`ApiClient`], which in turn talks to an injected [`HttpTransport`].
//!
//! `ApiClient` owns the header conventions shared by all mutating calls:
//! `X-Requested-With: XMLHttpRequest` always, `X-CSRFToken` only when a token
//! is configured. A missing token never fails a request.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::ClientError;

pub mod reqwest_transport;

#[cfg(test)]
pub mod mock;

pub use reqwest_transport::ReqwestTransport;

pub const HEADER_REQUESTED_WITH: &str = "X-Requested-With";
pub const HEADER_CSRF: &str = "X-CSRFToken";
const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn is_mutating(self) -> bool {
        !matches!(self, Method::Get)
    }
}

/// A single file sent as one multipart field.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
    Multipart(FilePart),
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parses the body as JSON regardless of status.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        if self.body.trim().is_empty() {
            return Err(ClientError::EmptyResponse);
        }
        serde_json::from_str(&self.body).map_err(ClientError::Parse)
    }

    /// Best-effort extraction of a human message from an error body.
    fn error_message(&self) -> String {
        #[derive(Deserialize)]
        struct ErrorBody {
            message: Option<String>,
            error: Option<String>,
        }

        serde_json::from_str::<ErrorBody>(&self.body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or_else(|| format!("Request failed with status {}", self.status))
    }
}

/// The transport abstraction injected into [`ApiClient`].
/// Production uses [`ReqwestTransport`]; tests use a recording mock.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError>;
}

/// Generic fetch wrapper shared by every controller.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    csrf_token: Option<String>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn HttpTransport>, csrf_token: Option<String>) -> Self {
        Self {
            transport,
            csrf_token: csrf_token.filter(|t| !t.is_empty()),
        }
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    fn headers_for(&self, method: Method) -> Vec<(String, String)> {
        let mut headers = Vec::new();
        if method.is_mutating() {
            headers.push((
                HEADER_REQUESTED_WITH.to_string(),
                REQUESTED_WITH_VALUE.to_string(),
            ));
            if let Some(token) = &self.csrf_token {
                headers.push((HEADER_CSRF.to_string(), token.clone()));
            }
        }
        headers
    }

    fn request(&self, method: Method, path: &str, body: RequestBody) -> ApiRequest {
        let mut request = ApiRequest::new(method, path);
        request.headers = self.headers_for(method);
        request.body = body;
        request
    }

    /// Sends a request and returns the raw response, whatever its status.
    /// Used by callers that read a JSON body on failure too (auth forms).
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        debug!("{:?} {}", request.method, request.path);
        self.transport.send(request).await
    }

    async fn send_expect_json<R: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<R, ClientError> {
        let path = request.path.clone();
        let response = self.send(request).await?;

        if !response.is_success() {
            let message = response.error_message();
            warn!("{} returned {}: {}", path, response.status, message);
            return Err(ClientError::Http {
                status: response.status,
                message,
            });
        }

        response.json()
    }

    pub async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<R, ClientError> {
        let mut request = self.request(Method::Get, path, RequestBody::Empty);
        request.query = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        self.send_expect_json(request).await
    }

    pub async fn post_json<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<R, ClientError> {
        let body = serde_json::to_value(payload)?;
        let request = self.request(Method::Post, path, RequestBody::Json(body));
        self.send_expect_json(request).await
    }

    /// Builds (without sending) a form-encoded POST carrying the standard headers.
    pub fn form_request(&self, path: &str, fields: Vec<(String, String)>) -> ApiRequest {
        self.request(Method::Post, path, RequestBody::Form(fields))
    }

    /// Form-encoded POST returning the raw response, whatever its status.
    pub async fn post_form(
        &self,
        path: &str,
        fields: Vec<(String, String)>,
    ) -> Result<ApiResponse, ClientError> {
        self.send(self.form_request(path, fields)).await
    }

    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R, ClientError> {
        let request = self.request(Method::Delete, path, RequestBody::Empty);
        self.send_expect_json(request).await
    }

    pub async fn upload<R: DeserializeOwned>(
        &self,
        path: &str,
        part: FilePart,
    ) -> Result<R, ClientError> {
        let request = self.request(Method::Post, path, RequestBody::Multipart(part));
        self.send_expect_json(request).await
    }
}
