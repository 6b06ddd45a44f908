//! Minimal REST client for the control-plane APIs
//!
//! Handles authentication, JSON decoding and the mapping of HTTP failures to
//! [`ApiError`]. Mutating calls hand back the [`AsyncRequest`] referenced by the
//! response's `Location` header when the control plane processes them
//! asynchronously. Retry and backoff are deliberately absent here.

use reqwest::header::{AUTHORIZATION, HeaderMap, LOCATION, USER_AGENT};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, trace};

use crate::request::AsyncRequest;

/// User agent string for cloudctl HTTP requests
const CLOUDCTL_USER_AGENT: &str = concat!("cloudctl/", env!("CARGO_PKG_VERSION"));

/// Failures talking to the control plane
#[derive(Error, Debug)]
pub enum ApiError {
    /// The addressed resource does not exist (404)
    #[error("404 Not Found: {path}")]
    NotFound { path: String },

    /// Any other non-success status
    #[error("HTTP {code}: {message}")]
    Status { code: u16, message: String },

    /// The request never produced a response
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not have the expected shape
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The configured base URL is unusable
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),
}

impl ApiError {
    /// Returns true if this is a "not found" error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Returns true if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        matches!(self, ApiError::Status { code, .. } if *code >= 500)
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Authenticated client for a single control-plane endpoint
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: url::Url,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for `base_url`, authenticating with an optional bearer token
    pub fn new(base_url: &str, token: Option<String>) -> ApiResult<Self> {
        let trimmed = base_url.trim_end_matches('/');
        let base_url =
            url::Url::parse(trimmed).map_err(|_| ApiError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(trimmed.to_string()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        })
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        trace!("{} {}", method, url);
        let mut builder = self
            .http
            .request(method, url)
            .header(USER_AGENT, CLOUDCTL_USER_AGENT);
        if let Some(token) = &self.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        builder
    }

    /// GET `path` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.request(Method::GET, path).send().await?;
        let response = check_status(path, response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// DELETE `path`, returning the async request tracking it if there is one
    pub async fn delete(&self, path: &str) -> ApiResult<Option<AsyncRequest>> {
        let response = self.request(Method::DELETE, path).send().await?;
        let response = check_status(path, response).await?;
        Ok(async_request_from(response.headers()))
    }

    /// PATCH `path` with a JSON body, returning the async request tracking it if there is one
    pub async fn patch_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<Option<AsyncRequest>> {
        let response = self
            .request(Method::PATCH, path)
            .json(body)
            .send()
            .await?;
        let response = check_status(path, response).await?;
        Ok(async_request_from(response.headers()))
    }
}

async fn check_status(path: &str, response: Response) -> ApiResult<Response> {
    let status = response.status();
    debug!("{} -> {}", path, status);
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound {
            path: path.to_string(),
        });
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        code: status.as_u16(),
        message: error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        }),
    })
}

/// Pull a human-readable message out of an error body
///
/// Accepts `{"messages": [{"message": ".."}]}`, `{"message": ".."}`, or plain text.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => value
            .get("messages")
            .and_then(|m| m.as_array())
            .and_then(|m| m.first())
            .and_then(|m| m.get("message"))
            .or_else(|| value.get("message"))
            .and_then(|m| m.as_str())
            .map(str::to_string),
        Err(_) => Some(trimmed.to_string()),
    }
}

fn async_request_from(headers: &HeaderMap) -> Option<AsyncRequest> {
    headers
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .and_then(AsyncRequest::from_location)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_messages_array() {
        let body = r#"{"httpStatus":422,"messages":[{"errorCode":"100","message":"Attribute 'name' is mandatory"}]}"#;
        assert_eq!(
            error_message(body).as_deref(),
            Some("Attribute 'name' is mandatory")
        );
    }

    #[test]
    fn test_error_message_from_plain_message() {
        assert_eq!(
            error_message(r#"{"message":"quota exceeded"}"#).as_deref(),
            Some("quota exceeded")
        );
    }

    #[test]
    fn test_error_message_plain_text_and_empty() {
        assert_eq!(error_message("  bad gateway ").as_deref(), Some("bad gateway"));
        assert_eq!(error_message(""), None);
        assert_eq!(error_message(r#"{"unrelated":true}"#), None);
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        assert!(matches!(
            ApiClient::new("not a url", None),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = ApiClient::new("https://api.example.com/", None).unwrap();
        assert_eq!(client.base_url(), "https://api.example.com/");
        let client = ApiClient::new("http://localhost:8080/prefix/", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/prefix");
    }
}
