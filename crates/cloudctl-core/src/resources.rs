//! Resource kinds and their completion wiring
//!
//! Each kind knows where it lives in the API and which completion signal its
//! mutations produce:
//!
//! | kind | API | delete completes via |
//! |------|-----|----------------------|
//! | network load balancer, NAT gateway, flow log | compute | request status |
//! | PostgreSQL cluster | DBaaS | non-existence (updates: state `AVAILABLE`) |
//! | token | auth | synchronous |

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::bulk::{BulkItem, Mutation};
use crate::client::ApiClient;
use crate::error::{CoreError, Result};
use crate::interrogator::{
    CompletionModel, ExistenceCompletion, ExistenceSource, Interrogator, RequestCompletion,
    RequestStatusSource, ResourceState, ResourceStateSource, StateCompletion,
};
use crate::request::{AsyncRequest, RequestStatus, RequestStatusResponse};

const COMPUTE_PREFIX: &str = "/cloudapi/v6";
const POSTGRES_PREFIX: &str = "/databases/postgresql";
const AUTH_PREFIX: &str = "/auth/v1";

/// State a PostgreSQL cluster settles in after a successful change
pub const POSTGRES_AVAILABLE: &str = "AVAILABLE";

/// States from which a PostgreSQL cluster will not recover on its own
pub const POSTGRES_FAILED_STATES: &[&str] = &["FAILED"];

/// A type of resource the CLI can list and mutate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    NetworkLoadBalancer {
        datacenter_id: String,
    },
    NatGateway {
        datacenter_id: String,
    },
    FlowLog {
        datacenter_id: String,
        natgateway_id: String,
    },
    PostgresCluster,
    Token,
}

impl ResourceKind {
    /// Singular name used in prompts and logs
    pub fn noun(&self) -> &'static str {
        match self {
            ResourceKind::NetworkLoadBalancer { .. } => "network load balancer",
            ResourceKind::NatGateway { .. } => "NAT gateway",
            ResourceKind::FlowLog { .. } => "flow log",
            ResourceKind::PostgresCluster => "PostgreSQL cluster",
            ResourceKind::Token => "token",
        }
    }

    /// Plural name used in "no ... found"
    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::NetworkLoadBalancer { .. } => "network load balancers",
            ResourceKind::NatGateway { .. } => "NAT gateways",
            ResourceKind::FlowLog { .. } => "flow logs",
            ResourceKind::PostgresCluster => "PostgreSQL clusters",
            ResourceKind::Token => "tokens",
        }
    }

    pub fn collection_path(&self) -> String {
        match self {
            ResourceKind::NetworkLoadBalancer { datacenter_id } => format!(
                "{}/datacenters/{}/networkloadbalancers",
                COMPUTE_PREFIX, datacenter_id
            ),
            ResourceKind::NatGateway { datacenter_id } => {
                format!("{}/datacenters/{}/natgateways", COMPUTE_PREFIX, datacenter_id)
            }
            ResourceKind::FlowLog {
                datacenter_id,
                natgateway_id,
            } => format!(
                "{}/datacenters/{}/natgateways/{}/flowlogs",
                COMPUTE_PREFIX, datacenter_id, natgateway_id
            ),
            ResourceKind::PostgresCluster => format!("{}/clusters", POSTGRES_PREFIX),
            ResourceKind::Token => format!("{}/tokens", AUTH_PREFIX),
        }
    }

    pub fn resource_path(&self, id: &str) -> String {
        format!("{}/{}", self.collection_path(), id)
    }

    fn list_path(&self) -> String {
        match self {
            ResourceKind::NetworkLoadBalancer { .. }
            | ResourceKind::NatGateway { .. }
            | ResourceKind::FlowLog { .. } => format!("{}?depth=1", self.collection_path()),
            _ => self.collection_path(),
        }
    }

    /// How a delete of this kind is observed to complete, if it is asynchronous
    pub fn delete_completion(&self) -> Option<CompletionModel> {
        match self {
            ResourceKind::NetworkLoadBalancer { .. }
            | ResourceKind::NatGateway { .. }
            | ResourceKind::FlowLog { .. } => Some(CompletionModel::Request),
            ResourceKind::PostgresCluster => Some(CompletionModel::Existence),
            ResourceKind::Token => None,
        }
    }
}

/// Summary of a listed resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSummary {
    pub id: String,
    pub name: Option<String>,
    pub state: Option<String>,
}

impl BulkItem for ResourceSummary {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default, alias = "tokens")]
    items: Vec<RawResource>,
}

#[derive(Debug, Deserialize)]
struct RawResource {
    id: String,
    #[serde(default)]
    properties: Option<RawProperties>,
    #[serde(default)]
    metadata: Option<RawMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProperties {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    state: Option<String>,
}

impl From<RawResource> for ResourceSummary {
    fn from(raw: RawResource) -> Self {
        let properties = raw.properties.unwrap_or_default();
        Self {
            id: raw.id,
            name: properties.name.or(properties.display_name),
            state: raw.metadata.and_then(|m| m.state),
        }
    }
}

/// Typed access to one resource kind
#[derive(Clone, Debug)]
pub struct ResourceApi {
    client: ApiClient,
    kind: ResourceKind,
}

impl ResourceApi {
    pub fn new(client: ApiClient, kind: ResourceKind) -> Self {
        Self { client, kind }
    }

    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    pub async fn list(&self) -> Result<Vec<ResourceSummary>> {
        let response: ListResponse = self.client.get_json(&self.kind.list_path()).await?;
        Ok(response.items.into_iter().map(Into::into).collect())
    }

    pub async fn delete(&self, id: &str) -> Result<Option<AsyncRequest>> {
        Ok(self.client.delete(&self.kind.resource_path(id)).await?)
    }

    /// PATCH the resource with `properties` wrapped as `{"properties": ...}`
    pub async fn update(
        &self,
        id: &str,
        properties: &serde_json::Value,
    ) -> Result<Option<AsyncRequest>> {
        if !properties.as_object().is_some_and(|p| !p.is_empty()) {
            return Err(CoreError::Validation(format!(
                "nothing to update on {} {}",
                self.kind.noun(),
                id
            )));
        }
        let body = serde_json::json!({ "properties": properties });
        Ok(self
            .client
            .patch_json(&self.kind.resource_path(id), &body)
            .await?)
    }

    /// Interrogator observing completion of a delete, if deletes are asynchronous
    pub fn delete_interrogator(&self) -> Option<Box<dyn Interrogator>> {
        match self.kind.delete_completion()? {
            CompletionModel::Request => Some(Box::new(RequestCompletion::new(
                RequestStatusApi::new(self.client.clone()),
            ))),
            CompletionModel::Existence => Some(Box::new(ExistenceCompletion::new(
                ResourceExistenceApi::new(self.client.clone(), self.kind.clone()),
            ))),
            CompletionModel::State => Some(Box::new(self.state_interrogator())),
        }
    }

    /// Interrogator waiting for the resource to settle back to its available state
    pub fn state_interrogator(&self) -> StateCompletion<ResourceStateApi> {
        StateCompletion::new(
            ResourceStateApi::new(self.client.clone(), self.kind.clone()),
            POSTGRES_AVAILABLE,
        )
        .with_failed_states(POSTGRES_FAILED_STATES.iter().copied())
    }
}

#[async_trait]
impl Mutation<ResourceSummary> for ResourceApi {
    async fn apply(&self, item: &ResourceSummary) -> Result<Option<AsyncRequest>> {
        self.delete(&item.id).await
    }
}

/// Reads `GET /requests/{id}/status` from the compute API
#[derive(Clone, Debug)]
pub struct RequestStatusApi {
    client: ApiClient,
}

impl RequestStatusApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RequestStatusSource for RequestStatusApi {
    async fn request_status(&self, request_id: &str) -> Result<RequestStatus> {
        let path = format!("{}/requests/{}/status", COMPUTE_PREFIX, request_id);
        let response: RequestStatusResponse = self.client.get_json(&path).await?;
        Ok(response.into())
    }
}

/// Reads `metadata.state` of a resource
#[derive(Clone, Debug)]
pub struct ResourceStateApi {
    client: ApiClient,
    kind: ResourceKind,
}

impl ResourceStateApi {
    pub fn new(client: ApiClient, kind: ResourceKind) -> Self {
        Self { client, kind }
    }
}

#[async_trait]
impl ResourceStateSource for ResourceStateApi {
    async fn resource_state(&self, resource_id: &str) -> Result<ResourceState> {
        let raw: RawResource = self
            .client
            .get_json(&self.kind.resource_path(resource_id))
            .await?;
        let state = raw.metadata.and_then(|m| m.state).unwrap_or_default();
        Ok(ResourceState::new(state))
    }
}

/// Checks whether a resource can still be fetched
#[derive(Clone, Debug)]
pub struct ResourceExistenceApi {
    client: ApiClient,
    kind: ResourceKind,
}

impl ResourceExistenceApi {
    pub fn new(client: ApiClient, kind: ResourceKind) -> Self {
        Self { client, kind }
    }
}

#[async_trait]
impl ExistenceSource for ResourceExistenceApi {
    async fn exists(&self, resource_id: &str) -> Result<bool> {
        match self
            .client
            .get_json::<serde_json::Value>(&self.kind.resource_path(resource_id))
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
