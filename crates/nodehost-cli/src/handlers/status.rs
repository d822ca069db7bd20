//! Status command handler.

use std::sync::Arc;

use anyhow::Result;
use nodehost_core::LivenessProbe;

use crate::bootstrap::{CliContext, resolve_binary};
use crate::commands::NodeArgs;
use crate::error::CliError;

/// Probe for a running instance without launching anything.
pub async fn execute(ctx: &CliContext, args: &NodeArgs) -> Result<()> {
    let binary = resolve_binary(args.node_path.as_deref(), &ctx.service_name);
    let detector = Arc::new(ctx.detector(args, binary.as_deref()));

    let detected = tokio::task::spawn_blocking(move || detector.detect())
        .await
        .map_err(|e| CliError::Core(e.to_string()))?
        .map_err(|e| CliError::Process(e.to_string()))?;

    match detected {
        Some(handle) => match handle.started_at_rfc3339() {
            Some(started) => println!("{} is running ({handle}, started {started})", ctx.service_name),
            None => println!("{} is running ({handle})", ctx.service_name),
        },
        None => println!("{} is not running", ctx.service_name),
    }
    Ok(())
}
