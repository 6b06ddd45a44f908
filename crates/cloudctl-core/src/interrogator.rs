//! Completion predicates for asynchronous work
//!
//! The control plane signals that a mutation has finished in one of three ways:
//!
//! - a request status reaching `DONE` or `FAILED` ([`RequestStatusSource`])
//! - the resource itself reaching a target state ([`ResourceStateSource`])
//! - the resource disappearing ([`ExistenceSource`])
//!
//! Each resource kind supplies a source for one of these, wrapped in the
//! matching adapter ([`RequestCompletion`], [`StateCompletion`],
//! [`ExistenceCompletion`]). The adapters all implement [`Interrogator`], so the
//! poller and the bulk runner only ever deal with a single [`Check`] answer.
//!
//! Every source call is a read; checking twice is the same as checking once.

use async_trait::async_trait;

use crate::error::Result;
use crate::request::{RequestState, RequestStatus};

/// Which completion signal an interrogator observes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionModel {
    /// Polls an async request id
    Request,
    /// Polls the resource until it reaches a target state
    State,
    /// Polls the resource until it no longer exists
    Existence,
}

/// One observation of a unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// Not terminal yet; `status` is what the control plane currently reports
    Pending { status: String },
    /// Terminal success
    Succeeded,
    /// Terminal failure
    Failed {
        status: String,
        message: Option<String>,
    },
}

impl Check {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Check::Pending { .. })
    }

    /// Short label for progress output
    pub fn status(&self) -> &str {
        match self {
            Check::Pending { status } | Check::Failed { status, .. } => status,
            Check::Succeeded => "DONE",
        }
    }
}

/// Answers "has this unit of work reached a terminal state?"
///
/// An `Err` is a transport/API failure and is distinct from
/// [`Check::Failed`], which is the control plane reporting a business failure.
#[async_trait]
pub trait Interrogator: Send + Sync {
    fn model(&self) -> CompletionModel;

    async fn check(&self, id: &str) -> Result<Check>;
}

/// Reads the status of an async request
#[async_trait]
pub trait RequestStatusSource: Send + Sync {
    async fn request_status(&self, request_id: &str) -> Result<RequestStatus>;
}

/// Provider-defined state string attached to a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceState(pub String);

impl ResourceState {
    pub fn new(state: impl Into<String>) -> Self {
        Self(state.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Reads the current state of a resource
#[async_trait]
pub trait ResourceStateSource: Send + Sync {
    async fn resource_state(&self, resource_id: &str) -> Result<ResourceState>;
}

/// Tells whether a resource still exists
///
/// Implementations map "not found" to `Ok(false)`; any other failure is an `Err`.
#[async_trait]
pub trait ExistenceSource: Send + Sync {
    async fn exists(&self, resource_id: &str) -> Result<bool>;
}

/// Completion by request status
pub struct RequestCompletion<S> {
    source: S,
}

impl<S: RequestStatusSource> RequestCompletion<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<S: RequestStatusSource> Interrogator for RequestCompletion<S> {
    fn model(&self) -> CompletionModel {
        CompletionModel::Request
    }

    async fn check(&self, id: &str) -> Result<Check> {
        let status = self.source.request_status(id).await?;
        Ok(match status.state {
            RequestState::Done => Check::Succeeded,
            RequestState::Failed => Check::Failed {
                status: status.state.to_string(),
                message: status.message,
            },
            state => Check::Pending {
                status: state.to_string(),
            },
        })
    }
}

/// Completion by resource state
///
/// Succeeds once the state equals `target`; fails on any of `failed`.
pub struct StateCompletion<S> {
    source: S,
    target: String,
    failed: Vec<String>,
}

impl<S: ResourceStateSource> StateCompletion<S> {
    pub fn new(source: S, target: impl Into<String>) -> Self {
        Self {
            source,
            target: target.into(),
            failed: Vec::new(),
        }
    }

    /// States that mean the operation will never reach the target
    pub fn with_failed_states<I, T>(mut self, failed: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.failed = failed.into_iter().map(Into::into).collect();
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

#[async_trait]
impl<S: ResourceStateSource> Interrogator for StateCompletion<S> {
    fn model(&self) -> CompletionModel {
        CompletionModel::State
    }

    async fn check(&self, id: &str) -> Result<Check> {
        let state = self.source.resource_state(id).await?;
        let state = state.as_str();
        if state == self.target {
            Ok(Check::Succeeded)
        } else if self.failed.iter().any(|f| f == state) {
            Ok(Check::Failed {
                status: state.to_string(),
                message: None,
            })
        } else {
            Ok(Check::Pending {
                status: state.to_string(),
            })
        }
    }
}

/// Completion by non-existence
pub struct ExistenceCompletion<S> {
    source: S,
}

impl<S: ExistenceSource> ExistenceCompletion<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<S: ExistenceSource> Interrogator for ExistenceCompletion<S> {
    fn model(&self) -> CompletionModel {
        CompletionModel::Existence
    }

    async fn check(&self, id: &str) -> Result<Check> {
        if self.source.exists(id).await? {
            Ok(Check::Pending {
                status: "EXISTS".to_string(),
            })
        } else {
            Ok(Check::Succeeded)
        }
    }
}
