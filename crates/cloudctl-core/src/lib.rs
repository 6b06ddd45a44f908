//! # cloudctl-core
//!
//! Shared engine behind the `cloudctl` CLI: tracking asynchronous control-plane
//! operations to completion and applying mutations to whole collections.
//!
//! ## Layout
//!
//! - [`interrogator`] - the three ways an operation reports completion
//!   (request status, resource state, resource existence)
//! - [`poller`] - drives an interrogator until done, failed or timed out
//! - [`bulk`] - confirm, mutate and wait, item by item, with aggregated failures
//! - [`confirm`] - confirmation gates for destructive operations
//! - [`resources`] - the resource kinds the CLI manages and their API bindings
//! - [`client`] - thin authenticated REST client
//! - [`config`] - TOML profiles
//!
//! ## Example
//!
//! ```rust,ignore
//! use cloudctl_core::{ApiClient, PollConfig, Poller, ResourceApi, ResourceKind};
//! use std::time::Duration;
//!
//! let client = ApiClient::new("https://api.ionos.com", Some(token))?;
//! let api = ResourceApi::new(client, ResourceKind::PostgresCluster);
//! api.delete("c-1").await?;
//!
//! let poller = Poller::new(PollConfig::new(true, Duration::from_secs(600)));
//! if let Some(interrogator) = api.delete_interrogator() {
//!     poller.poll(interrogator.as_ref(), "c-1").await?;
//! }
//! ```

pub mod bulk;
pub mod client;
pub mod config;
pub mod confirm;
pub mod error;
pub mod interrogator;
pub mod poller;
pub mod request;
pub mod resources;

pub use bulk::{BulkItem, BulkMutator, BulkOutcome, ItemOutcome, Mutation};
pub use client::{ApiClient, ApiError};
pub use config::{Config, ConfigError, DEFAULT_API_URL, Profile};
pub use confirm::{AFFIRMATIVE_ANSWERS, AlwaysConfirm, Confirmer, LineConfirmer, is_affirmative};
pub use error::{BulkFailure, CoreError, Result};
pub use interrogator::{
    Check, CompletionModel, ExistenceCompletion, ExistenceSource, Interrogator,
    RequestCompletion, RequestStatusSource, ResourceState, ResourceStateSource, StateCompletion,
};
pub use poller::{
    DEFAULT_INTERVAL, DEFAULT_TIMEOUT, DEFAULT_TIMEOUT_SECS, PollConfig, Poller, ProgressCallback,
    ProgressEvent, poll,
};
pub use request::{AsyncRequest, RequestState, RequestStatus};
pub use resources::{
    POSTGRES_AVAILABLE, POSTGRES_FAILED_STATES, RequestStatusApi, ResourceApi,
    ResourceExistenceApi, ResourceKind, ResourceStateApi, ResourceSummary,
};
