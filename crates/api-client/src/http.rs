//! HTTP request/response types and the base transport
//!
//! This module defines the request and response values that flow through the
//! transport stack, the [`Transport`] trait every layer implements, and
//! [`HttpTransport`], the reqwest-backed sender at the bottom of the stack.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::RefreshError;
use crate::config::ClientConfig;

/// Authorization header name
pub const AUTHORIZATION: &str = "Authorization";

/// Default content type for request bodies
pub const JSON_CONTENT_TYPE: &str = "application/json";

// =============================================================================
// Error Types
// =============================================================================

/// Errors returned by the API client
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure before a response was received
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response from the server
    #[error("API error ({status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message from server (or the raw body)
        message: String,
        /// Parsed JSON body, if any
        body: Option<serde_json::Value>,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Session store error
    #[error("Storage error: {0}")]
    Store(#[from] storage::StoreError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The access token expired and could not be refreshed
    ///
    /// Persisted credentials have been cleared and the login redirect has
    /// fired by the time this is returned.
    #[error("Session expired: {0}")]
    SessionExpired(#[source] RefreshError),
}

impl ApiError {
    /// Build a status error from a status code and message
    pub fn status_error(status: u16, message: impl Into<String>) -> Self {
        ApiError::Status {
            status,
            message: message.into(),
            body: None,
        }
    }

    /// Get the HTTP status code, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this is a 401 response
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }

    /// Check if the session is gone and the user must log in again
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired(_))
    }
}

/// Error body format returned by the backend error handler
#[derive(Debug, Clone, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

// =============================================================================
// Request Types
// =============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET request
    Get,
    /// POST request
    Post,
    /// PUT request
    Put,
    /// DELETE request
    Delete,
}

impl HttpMethod {
    /// Get the method name
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A request against the API
///
/// Paths are relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Endpoint path (e.g., "/auth/login")
    pub path: String,
    /// Query parameters
    pub params: Vec<(String, String)>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body
    pub body: Option<Vec<u8>>,
    /// Encoding type of the body
    pub encoding: Option<String>,
}

impl ApiRequest {
    /// Create a new request
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            headers: HashMap::new(),
            body: None,
            encoding: None,
        }
    }

    /// Create a GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Create a POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Create a PUT request
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// Create a DELETE request
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the bearer token, replacing any existing Authorization header
    pub fn bearer(mut self, token: &str) -> Self {
        self.headers
            .retain(|key, _| !key.eq_ignore_ascii_case(AUTHORIZATION));
        self.header(AUTHORIZATION, format!("Bearer {}", token))
    }

    /// Get the Authorization header value
    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(AUTHORIZATION))
            .map(|(_, value)| value.as_str())
    }

    /// Set the request body from JSON
    pub fn json_body<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_vec(value)?);
        self.encoding = Some(JSON_CONTENT_TYPE.to_string());
        Ok(self)
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// A successful (2xx) response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Raw response body
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Create a new response
    pub fn new(status: u16, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        Self { status, headers, body }
    }

    /// Create a response with a JSON body
    pub fn json_value(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: serde_json::to_vec(value).unwrap_or_default(),
        }
    }

    /// Get a header value
    pub fn header(&self, key: &str) -> Option<&String> {
        self.headers.get(key)
    }

    /// Check if the response is successful (2xx status)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON; an empty body decodes as `null`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_slice(b"null")?);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }
}

// =============================================================================
// Transport
// =============================================================================

/// Something that can send an [`ApiRequest`]
///
/// The base transport talks to the network; every other implementation is a
/// layer that decorates an inner transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request; non-2xx responses are returned as [`ApiError::Status`]
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        (**self).send(request).await
    }
}

/// reqwest-backed base transport
///
/// Keeps cookies between calls and sends `Content-Type: application/json`
/// by default.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    /// Create a new transport
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        for (key, value) in &config.default_headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| ApiError::InvalidInput(format!("header {}: {}", key, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::InvalidInput(format!("header {}: {}", key, e)))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .cookie_store(true)
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the transport configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Convert a reqwest response into an [`ApiResponse`] or status error
    async fn parse_response(response: reqwest::Response) -> Result<ApiResponse, ApiError> {
        let status = response.status().as_u16();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(value_str) = value.to_str() {
                headers.insert(key.to_string(), value_str.to_string());
            }
        }

        let success = response.status().is_success();
        let body = response.bytes().await?.to_vec();

        if !success {
            let text = String::from_utf8_lossy(&body).into_owned();
            let json = serde_json::from_slice::<serde_json::Value>(&body).ok();
            let parsed = json
                .as_ref()
                .and_then(|value| serde_json::from_value::<ErrorBody>(value.clone()).ok())
                .unwrap_or_default();
            let message = parsed
                .message
                .or(parsed.error)
                .unwrap_or_else(|| format!("HTTP {}: {}", status, text));

            return Err(ApiError::Status { status, message, body: json });
        }

        Ok(ApiResponse::new(status, headers, body))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.config.url(&request.path);

        let mut req = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };

        if !request.params.is_empty() {
            req = req.query(&request.params);
        }

        for (key, value) in &request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            if let Some(encoding) = &request.encoding {
                req = req.header(CONTENT_TYPE, encoding);
            }
            req = req.body(body);
        }

        tracing::debug!(method = request.method.as_str(), path = %request.path, "sending request");

        let response = req.send().await?;
        Self::parse_response(response).await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let req = ApiRequest::get("/appointments")
            .param("week", "24")
            .header("X-Trace", "abc");

        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "/appointments");
        assert_eq!(req.params, vec![("week".to_string(), "24".to_string())]);
        assert_eq!(req.headers.get("X-Trace"), Some(&"abc".to_string()));
        assert!(req.body.is_none());
    }

    #[test]
    fn test_bearer_replaces_existing_header() {
        let req = ApiRequest::get("/me").bearer("old").bearer("new");
        assert_eq!(req.authorization(), Some("Bearer new"));
        assert_eq!(req.headers.len(), 1);
    }

    #[test]
    fn test_authorization_lookup_is_case_insensitive() {
        let req = ApiRequest::get("/me").header("authorization", "Bearer x");
        assert_eq!(req.authorization(), Some("Bearer x"));
    }

    #[test]
    fn test_json_body() {
        let req = ApiRequest::post("/auth/login")
            .json_body(&serde_json::json!({"email": "ama@example.com"}))
            .unwrap();

        assert_eq!(req.encoding.as_deref(), Some(JSON_CONTENT_TYPE));
        let body = String::from_utf8(req.body.unwrap()).unwrap();
        assert!(body.contains("ama@example.com"));
    }

    #[test]
    fn test_response_json() {
        let response = ApiResponse::json_value(200, &serde_json::json!({"week": 24}));
        assert!(response.is_success());

        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["week"], 24);
    }

    #[test]
    fn test_empty_response_decodes_as_unit() {
        let response = ApiResponse::new(204, HashMap::new(), Vec::new());
        response.json::<()>().unwrap();

        let missing: Option<String> = response.json().unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_error_status_helpers() {
        let unauthorized = ApiError::status_error(401, "jwt expired");
        assert_eq!(unauthorized.status(), Some(401));
        assert!(unauthorized.is_unauthorized());
        assert!(!unauthorized.is_session_expired());

        let server = ApiError::status_error(500, "boom");
        assert!(!server.is_unauthorized());
        assert!(server.to_string().contains("500"));

        let invalid = ApiError::InvalidInput("x".to_string());
        assert_eq!(invalid.status(), None);
    }

    #[test]
    fn test_http_method_as_str() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
        assert_eq!(HttpMethod::Put.as_str(), "PUT");
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
    }

    #[test]
    fn test_http_transport_new() {
        let config = ClientConfig::new("http://localhost:5000/api").with_header("X-Client", "test");
        let transport = HttpTransport::new(config).unwrap();
        assert_eq!(transport.config().base_url, "http://localhost:5000/api");
    }

    #[test]
    fn test_http_transport_rejects_bad_header() {
        let config = ClientConfig::default().with_header("bad header", "x");
        assert!(matches!(HttpTransport::new(config), Err(ApiError::InvalidInput(_))));
    }
}
