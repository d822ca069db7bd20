//! Send command handler.
//!
//! One-shot request against the node's control socket: connect, write one
//! message, print the first reply. With `--method` the message is a JSON-RPC
//! request and only the response carrying its id counts as the reply.

use std::time::Duration;

use anyhow::Result;
use nodehost_runtime::{ControlChannel, JsonRpcRequest, JsonRpcResponse, MessageSubscription};
use serde_json::Value;
use tracing::debug;

use crate::bootstrap::CliContext;
use crate::commands::SendArgs;
use crate::error::CliError;

const REQUEST_ID: u64 = 1;

pub async fn execute(ctx: &CliContext, args: &SendArgs) -> Result<()> {
    let message = build_message(args)?;
    let address = ctx.ipc_path(args.ipc_path.as_deref());

    let channel = ControlChannel::new();
    let mut inbound = channel.subscribe();
    channel.send(message);
    channel.open(&address).await.map_err(CliError::from)?;

    let wait = Duration::from_secs(args.timeout);
    let expect_id = args.method.is_some().then_some(REQUEST_ID);
    let reply = tokio::time::timeout(wait, next_reply(&mut inbound, expect_id))
        .await
        .map_err(|_| CliError::Timeout(format!("no reply within {}s", args.timeout)))?
        .ok_or_else(|| CliError::Unavailable("connection closed before a reply".to_string()))?;

    channel.close();
    println!("{reply}");
    Ok(())
}

fn build_message(args: &SendArgs) -> Result<String, CliError> {
    match (&args.method, &args.message) {
        (Some(method), _) => {
            let params: Value = serde_json::from_str(&args.params)
                .map_err(|e| CliError::Arguments(format!("--params is not JSON: {e}")))?;
            JsonRpcRequest::new(REQUEST_ID, method.as_str(), params)
                .to_message()
                .map_err(|e| CliError::Core(e.to_string()))
        }
        (None, Some(message)) => Ok(message.clone()),
        (None, None) => Err(CliError::Arguments(
            "a message or --method is required".to_string(),
        )),
    }
}

async fn next_reply(inbound: &mut MessageSubscription, expect_id: Option<u64>) -> Option<String> {
    loop {
        let message = inbound.next_message().await?;
        match expect_id {
            None => return Some(message),
            Some(id) => match JsonRpcResponse::parse(&message) {
                Ok(response) if response.answers(id) => return Some(message),
                _ => debug!(message = %message, "Skipping unrelated message"),
            },
        }
    }
}
