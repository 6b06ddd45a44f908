//! List and delete commands shared by every resource kind

use cloudctl_core::{
    BulkMutator, Confirmer, CoreError, Poller, ResourceApi, ResourceKind, ResourceSummary,
};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use super::CommandContext;
use super::wait::progress_poller;
use crate::cli::{DeleteTarget, WaitArgs};
use crate::confirm::TerminalConfirmer;
use crate::error::Result as CliResult;
use crate::output::{OutputFormat, print_output};

/// One deleted item, as printed after the command finishes
#[derive(Debug, Serialize)]
struct Deleted {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<String>,
    /// False when the control plane may still be processing the delete
    completed: bool,
}

pub async fn handle_list(ctx: &CommandContext<'_>, kind: ResourceKind) -> CliResult<()> {
    let (client, _) = ctx.conn_mgr.create_client(ctx.profile)?;
    let api = ResourceApi::new(client, kind);

    debug!("Listing {}", api.kind().plural());
    let items = api.list().await?;
    info!("Found {} {}", items.len(), api.kind().plural());

    print_output(&items, ctx.output)?;
    Ok(())
}

pub async fn handle_delete(
    ctx: &CommandContext<'_>,
    kind: ResourceKind,
    target: &DeleteTarget,
    wait: &WaitArgs,
) -> CliResult<()> {
    let (client, connection) = ctx.conn_mgr.create_client(ctx.profile)?;
    let api = ResourceApi::new(client, kind);

    let poll_config = wait.poll_config(connection.wait_timeout);
    debug!("Poll config: {:?}", poll_config);
    let poller = progress_poller(poll_config);
    let confirmer = TerminalConfirmer::new();

    match &target.id {
        Some(id) => delete_one(ctx, &api, id, target.force, &confirmer, &poller).await,
        None => delete_all(ctx, &api, target.force, &confirmer, &poller).await,
    }
}

/// Confirm, delete, then wait if asked to
async fn delete_one(
    ctx: &CommandContext<'_>,
    api: &ResourceApi,
    id: &str,
    force: bool,
    confirmer: &dyn Confirmer,
    poller: &Poller,
) -> CliResult<()> {
    let noun = api.kind().noun();
    if !confirmer.ask(&format!("Delete {} {}?", noun, id), force)? {
        return Err(CoreError::Declined { id: id.to_string() }.into());
    }

    let request = api.delete(id).await?;
    info!("Delete of {} {} accepted", noun, id);

    let completed = match api.delete_interrogator() {
        Some(interrogator) => {
            poller
                .wait_for_mutation(interrogator.as_ref(), id, request.as_ref())
                .await?
        }
        None => true,
    };

    let deleted = Deleted {
        id: id.to_string(),
        request_id: request.map(|r| r.request_id),
        completed,
    };
    report(ctx.output, noun, &[deleted])
}

/// Delete every item currently listed for the kind
async fn delete_all(
    ctx: &CommandContext<'_>,
    api: &ResourceApi,
    force: bool,
    confirmer: &dyn Confirmer,
    poller: &Poller,
) -> CliResult<()> {
    let kind = api.kind();
    let items: Vec<ResourceSummary> = api.list().await?;
    info!("Deleting {} {}", items.len(), kind.plural());

    let interrogator = api.delete_interrogator();
    let outcome = BulkMutator::new(kind.noun(), confirmer, poller)
        .force(force)
        .run(&items, api, interrogator.as_deref())
        .await
        .map_err(|e| match e {
            CoreError::NoItems { .. } => CoreError::NoItems {
                kind: kind.plural().to_string(),
            },
            other => other,
        })?;

    let deleted: Vec<Deleted> = outcome
        .items()
        .iter()
        .filter(|o| o.is_success())
        .map(|o| Deleted {
            id: o.item_id.clone(),
            request_id: o.request.as_ref().map(|r| r.request_id.clone()),
            completed: o.completed,
        })
        .collect();
    if deleted.len() < outcome.len() {
        warn!(
            "{} of {} {} could not be deleted",
            outcome.len() - deleted.len(),
            outcome.len(),
            kind.plural()
        );
    }
    report(ctx.output, kind.noun(), &deleted)?;

    outcome.into_result()?;
    Ok(())
}

fn report(output: OutputFormat, noun: &str, deleted: &[Deleted]) -> CliResult<()> {
    if output.is_json() {
        print_output(json!({ "deleted": deleted }), output)?;
        return Ok(());
    }
    for item in deleted {
        match (&item.request_id, item.completed) {
            (_, true) => println!("Deleted {} {}", noun, item.id),
            (Some(request_id), false) => println!(
                "Delete of {} {} accepted (request {}). To wait for completion, run: cloudctl request wait {}",
                noun, item.id, request_id, request_id
            ),
            (None, false) => println!("Delete of {} {} accepted", noun, item.id),
        }
    }
    Ok(())
}
