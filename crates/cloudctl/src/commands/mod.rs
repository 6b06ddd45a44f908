//! Command implementations

pub mod postgres;
pub mod profile;
pub mod request;
pub mod resource;
pub mod wait;

use cloudctl_core::ResourceKind;

use crate::cli::{
    DatacenterCommands, FlowLogCommands, PostgresCommands, RequestCommands, TokenCommands,
    WaitArgs,
};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output::OutputFormat;

/// What every API command needs from the global flags
pub struct CommandContext<'a> {
    pub conn_mgr: &'a ConnectionManager,
    pub profile: Option<&'a str>,
    pub output: OutputFormat,
}

pub async fn handle_datacenter_command(
    ctx: &CommandContext<'_>,
    cmd: &DatacenterCommands,
    kind: impl Fn(String) -> ResourceKind,
) -> CliResult<()> {
    match cmd {
        DatacenterCommands::List { datacenter_id } => {
            resource::handle_list(ctx, kind(datacenter_id.clone())).await
        }
        DatacenterCommands::Delete {
            datacenter_id,
            target,
            wait,
        } => resource::handle_delete(ctx, kind(datacenter_id.clone()), target, wait).await,
    }
}

pub async fn handle_flowlog_command(
    ctx: &CommandContext<'_>,
    cmd: &FlowLogCommands,
) -> CliResult<()> {
    match cmd {
        FlowLogCommands::List {
            datacenter_id,
            natgateway_id,
        } => {
            let kind = ResourceKind::FlowLog {
                datacenter_id: datacenter_id.clone(),
                natgateway_id: natgateway_id.clone(),
            };
            resource::handle_list(ctx, kind).await
        }
        FlowLogCommands::Delete {
            datacenter_id,
            natgateway_id,
            target,
            wait,
        } => {
            let kind = ResourceKind::FlowLog {
                datacenter_id: datacenter_id.clone(),
                natgateway_id: natgateway_id.clone(),
            };
            resource::handle_delete(ctx, kind, target, wait).await
        }
    }
}

pub async fn handle_postgres_command(
    ctx: &CommandContext<'_>,
    cmd: &PostgresCommands,
) -> CliResult<()> {
    match cmd {
        PostgresCommands::List => resource::handle_list(ctx, ResourceKind::PostgresCluster).await,
        PostgresCommands::Delete { target, wait } => {
            resource::handle_delete(ctx, ResourceKind::PostgresCluster, target, wait).await
        }
        PostgresCommands::Update {
            id,
            instances,
            cores,
            ram,
            wait,
        } => {
            let resize = postgres::ClusterResize {
                instances: *instances,
                cores: *cores,
                ram: *ram,
            };
            postgres::handle_update(ctx, id, resize, wait).await
        }
    }
}

pub async fn handle_token_command(ctx: &CommandContext<'_>, cmd: &TokenCommands) -> CliResult<()> {
    match cmd {
        TokenCommands::List => resource::handle_list(ctx, ResourceKind::Token).await,
        TokenCommands::Delete { target } => {
            resource::handle_delete(ctx, ResourceKind::Token, target, &WaitArgs::default()).await
        }
    }
}

pub async fn handle_request_command(
    ctx: &CommandContext<'_>,
    cmd: &RequestCommands,
) -> CliResult<()> {
    match cmd {
        RequestCommands::Get { id } => request::handle_get(ctx, id).await,
        RequestCommands::Wait { id, timeout } => request::handle_wait(ctx, id, *timeout).await,
    }
}
