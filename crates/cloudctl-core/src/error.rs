//! Unified error handling for cloudctl-core
//!
//! Separates the failure classes a caller needs to tell apart: transport/API
//! failures, business failures reported by the control plane, timeouts, and
//! the aggregated outcome of a bulk run.
//!
//! # Example
//!
//! ```rust
//! use cloudctl_core::{ApiError, CoreError};
//!
//! let err: CoreError = ApiError::NotFound {
//!     path: "/cloudapi/v6/datacenters/dc-1".to_string(),
//! }
//! .into();
//! assert!(err.is_not_found());
//! assert!(!err.is_timeout());
//! ```

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::client::ApiError;
use crate::config::ConfigError;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Transport or API failure while talking to the control plane
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Gave up waiting; the operation may still be in progress
    #[error("timed out waiting for {id} after {elapsed:?} (timeout {timeout:?})")]
    Timeout {
        id: String,
        elapsed: Duration,
        timeout: Duration,
    },

    /// The control plane reported a terminal failure
    #[error("{id} failed with status {status}{}", message_suffix(.message))]
    OperationFailed {
        id: String,
        status: String,
        message: Option<String>,
    },

    /// An `--all` operation found nothing to act on
    #[error("no {kind} found")]
    NoItems { kind: String },

    /// The user answered "no" to a confirmation prompt
    #[error("user denied confirmation for {id}")]
    Declined { id: String },

    /// One or more items of a bulk run failed
    #[error(transparent)]
    Bulk(#[from] BulkFailure),

    /// Could not read a confirmation answer
    #[error("Confirmation error: {0}")]
    Confirmation(String),

    /// Invalid input detected before any request was issued
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::Api(e) if e.is_not_found())
    }

    /// Returns true if we stopped waiting before the operation reached a terminal state
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, CoreError::Timeout { .. })
    }

    /// Returns true if the user declined a confirmation prompt
    #[must_use]
    pub fn is_declined(&self) -> bool {
        matches!(self, CoreError::Declined { .. })
    }

    /// Returns true if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, CoreError::Api(e) if e.is_server_error())
    }
}

/// Per-item failures collected by a bulk run, in input order
#[derive(Debug)]
pub struct BulkFailure {
    attempted: usize,
    failures: Vec<(String, CoreError)>,
}

impl BulkFailure {
    pub(crate) fn new(attempted: usize, failures: Vec<(String, CoreError)>) -> Self {
        Self {
            attempted,
            failures,
        }
    }

    /// Number of items the batch contained
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    /// Failed item ids with their errors
    pub fn failures(&self) -> &[(String, CoreError)] {
        &self.failures
    }

    /// Ids of the failed items
    pub fn failed_ids(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|(id, _)| id.as_str())
    }
}

impl fmt::Display for BulkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} operations failed:",
            self.failures.len(),
            self.attempted
        )?;
        for (id, err) in &self.failures {
            write!(f, "\n  - {id}: {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BulkFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_delegates_to_api_error() {
        let err: CoreError = ApiError::NotFound {
            path: "/x".to_string(),
        }
        .into();
        assert!(err.is_not_found());
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_server_error_delegates_to_api_error() {
        let err: CoreError = ApiError::Status {
            code: 503,
            message: "unavailable".to_string(),
        }
        .into();
        assert!(err.is_server_error());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_timeout_names_id_and_durations() {
        let err = CoreError::Timeout {
            id: "req-1".to_string(),
            elapsed: Duration::from_secs(61),
            timeout: Duration::from_secs(60),
        };
        assert!(err.is_timeout());
        let msg = err.to_string();
        assert!(msg.contains("req-1"));
        assert!(msg.contains("61s"));
        assert!(msg.contains("60s"));
    }

    #[test]
    fn test_operation_failed_display() {
        let with_message = CoreError::OperationFailed {
            id: "req-1".to_string(),
            status: "FAILED".to_string(),
            message: Some("quota exceeded".to_string()),
        };
        assert_eq!(
            with_message.to_string(),
            "req-1 failed with status FAILED: quota exceeded"
        );

        let bare = CoreError::OperationFailed {
            id: "cl-1".to_string(),
            status: "FAILED".to_string(),
            message: None,
        };
        assert_eq!(bare.to_string(), "cl-1 failed with status FAILED");
    }

    #[test]
    fn test_bulk_failure_lists_every_item() {
        let failure = BulkFailure::new(
            5,
            vec![
                ("2".to_string(), CoreError::Validation("bad".to_string())),
                ("5".to_string(), CoreError::Validation("worse".to_string())),
            ],
        );
        let msg = failure.to_string();
        assert!(msg.starts_with("2 of 5 operations failed"));
        assert!(msg.contains("2: Validation error: bad"));
        assert!(msg.contains("5: Validation error: worse"));
        assert_eq!(failure.failed_ids().collect::<Vec<_>>(), vec!["2", "5"]);
    }
}
