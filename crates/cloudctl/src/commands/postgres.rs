//! PostgreSQL cluster changes that settle through the cluster's own state

use cloudctl_core::{ResourceApi, ResourceKind};
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use super::CommandContext;
use super::wait::progress_poller;
use crate::cli::WaitArgs;
use crate::error::{CliError, Result as CliResult};
use crate::output::print_output;

/// Size changes requested on the command line
#[derive(Debug, Default, Clone, Copy)]
pub struct ClusterResize {
    pub instances: Option<u32>,
    pub cores: Option<u32>,
    pub ram: Option<u32>,
}

impl ClusterResize {
    /// Properties for the PATCH body
    fn properties(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        if let Some(instances) = self.instances {
            properties.insert("instances".to_string(), json!(instances));
        }
        if let Some(cores) = self.cores {
            properties.insert("cores".to_string(), json!(cores));
        }
        if let Some(ram) = self.ram {
            properties.insert("ram".to_string(), json!(ram));
        }
        properties
    }
}

pub async fn handle_update(
    ctx: &CommandContext<'_>,
    id: &str,
    resize: ClusterResize,
    wait: &WaitArgs,
) -> CliResult<()> {
    let properties = resize.properties();
    if properties.is_empty() {
        return Err(CliError::InvalidInput {
            message: "specify at least one of --instances, --cores or --ram".to_string(),
        });
    }

    let (client, connection) = ctx.conn_mgr.create_client(ctx.profile)?;
    let api = ResourceApi::new(client, ResourceKind::PostgresCluster);

    debug!("Updating cluster {} with {:?}", id, properties);
    api.update(id, &Value::Object(properties)).await?;
    info!("Update of PostgreSQL cluster {} accepted", id);

    let poll_config = wait.poll_config(connection.wait_timeout);
    let interrogator = api.state_interrogator();
    progress_poller(poll_config).poll(&interrogator, id).await?;

    if ctx.output.is_json() {
        let state = poll_config.enabled.then(|| interrogator.target());
        print_output(json!({ "id": id, "state": state }), ctx.output)?;
    } else if poll_config.enabled {
        println!("PostgreSQL cluster {} is {}", id, interrogator.target());
    } else {
        println!("Update of PostgreSQL cluster {} accepted", id);
    }
    Ok(())
}
