//! Asynchronous request references and their status
//!
//! Mutating compute calls are accepted with `202` and a `Location` header of the
//! form `.../requests/{id}/status`. The id identifies the unit of work until the
//! control plane reports it `DONE` or `FAILED`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Handle to a unit of work the control plane is still processing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AsyncRequest {
    pub request_id: String,
    pub issued_at: DateTime<Utc>,
}

impl AsyncRequest {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            issued_at: Utc::now(),
        }
    }

    /// Extract the request id from a `Location` header value
    ///
    /// Returns `None` when the location does not reference a request.
    pub fn from_location(location: &str) -> Option<Self> {
        let path = match url::Url::parse(location) {
            Ok(url) => url.path().to_string(),
            Err(_) => location.to_string(),
        };
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        segments.find(|s| *s == "requests")?;
        let id = segments.next()?;
        Some(Self::new(id))
    }
}

/// Lifecycle of an asynchronous request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestState {
    Queued,
    Running,
    Done,
    Failed,
    #[serde(other)]
    Unknown,
}

impl RequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Queued => "QUEUED",
            RequestState::Running => "RUNNING",
            RequestState::Done => "DONE",
            RequestState::Failed => "FAILED",
            RequestState::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a request's progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestStatus {
    pub state: RequestState,
    pub message: Option<String>,
}

impl RequestStatus {
    pub fn new(state: RequestState) -> Self {
        Self {
            state,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            state: RequestState::Failed,
            message: Some(message.into()),
        }
    }
}

/// Wire shape of `GET /requests/{id}/status`
#[derive(Debug, Deserialize)]
pub(crate) struct RequestStatusResponse {
    pub metadata: RequestStatusMetadata,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RequestStatusMetadata {
    pub status: RequestState,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<RequestStatusResponse> for RequestStatus {
    fn from(response: RequestStatusResponse) -> Self {
        Self {
            state: response.metadata.status,
            message: response.metadata.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_location_absolute_url() {
        let req = AsyncRequest::from_location(
            "https://api.example.com/cloudapi/v6/requests/5d3c-11aa/status",
        )
        .unwrap();
        assert_eq!(req.request_id, "5d3c-11aa");
    }

    #[test]
    fn test_from_location_relative_path() {
        let req = AsyncRequest::from_location("/cloudapi/v6/requests/abc/status").unwrap();
        assert_eq!(req.request_id, "abc");
    }

    #[test]
    fn test_from_location_without_request() {
        assert!(
            AsyncRequest::from_location("https://api.example.com/cloudapi/v6/datacenters/x")
                .is_none()
        );
        assert!(
            AsyncRequest::from_location("https://api.example.com/cloudapi/v6/requests").is_none()
        );
    }

    #[test]
    fn test_request_status_decodes_wire_shape() {
        let body = r#"{"id":"r1","metadata":{"status":"FAILED","message":"out of capacity"}}"#;
        let status: RequestStatus = serde_json::from_str::<RequestStatusResponse>(body)
            .unwrap()
            .into();
        assert_eq!(status, RequestStatus::failed("out of capacity"));
    }

    #[test]
    fn test_unknown_state_is_tolerated() {
        let body = r#"{"metadata":{"status":"PAUSED"}}"#;
        let status: RequestStatus = serde_json::from_str::<RequestStatusResponse>(body)
            .unwrap()
            .into();
        assert_eq!(status.state, RequestState::Unknown);
        assert_eq!(status.message, None);
    }
}
