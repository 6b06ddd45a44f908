//! Inspecting and waiting for asynchronous requests

use std::time::Duration;

use cloudctl_core::{
    DEFAULT_TIMEOUT, PollConfig, RequestCompletion, RequestStatusApi, RequestStatusSource,
};
use serde_json::json;

use super::CommandContext;
use super::wait::progress_poller;
use crate::error::Result as CliResult;
use crate::output::print_output;

pub async fn handle_get(ctx: &CommandContext<'_>, id: &str) -> CliResult<()> {
    let (client, _) = ctx.conn_mgr.create_client(ctx.profile)?;
    let status = RequestStatusApi::new(client).request_status(id).await?;

    print_output(
        json!({
            "request_id": id,
            "state": status.state,
            "message": status.message,
        }),
        ctx.output,
    )?;
    Ok(())
}

pub async fn handle_wait(
    ctx: &CommandContext<'_>,
    id: &str,
    timeout_secs: Option<u64>,
) -> CliResult<()> {
    let (client, connection) = ctx.conn_mgr.create_client(ctx.profile)?;
    let timeout = timeout_secs
        .map(Duration::from_secs)
        .or(connection.wait_timeout)
        .unwrap_or(DEFAULT_TIMEOUT);

    let interrogator = RequestCompletion::new(RequestStatusApi::new(client));
    progress_poller(PollConfig::new(true, timeout))
        .poll(&interrogator, id)
        .await?;

    if ctx.output.is_json() {
        print_output(json!({ "request_id": id, "state": "DONE" }), ctx.output)?;
    } else {
        println!("Request {} is DONE", id);
    }
    Ok(())
}
