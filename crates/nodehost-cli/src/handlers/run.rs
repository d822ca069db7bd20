//! Run command handler.
//!
//! Launches the node (or adopts one already running), then keeps a control
//! session open: stdin lines are sent as messages, inbound messages are
//! printed. Lines typed before the node's socket exists are queued and
//! flushed once it connects. Ctrl-C stops the owned child and waits for it
//! to exit before returning.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use nodehost_core::{HostEvent, LaunchOutcome};
use nodehost_runtime::{ChannelError, ChannelEvent, ControlChannel, HostEventBroadcaster};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::bootstrap::{CliContext, resolve_binary};
use crate::commands::RunArgs;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext, args: RunArgs) -> Result<()> {
    let binary = resolve_binary(args.node.node_path.as_deref(), &ctx.service_name);
    let detector = ctx.detector(&args.node, binary.as_deref());
    let config = ctx.launch_config(&args, binary);
    let supervisor = ctx.supervisor(config, detector)?;

    let printer = spawn_event_printer(&ctx.events);

    let outcome = supervisor.start().await;
    println!("{}: {outcome}", ctx.service_name);
    if let LaunchOutcome::Failed { cause } = outcome {
        printer.abort();
        return Err(CliError::Process(cause.to_string()).into());
    }

    let shutdown = tokio::signal::ctrl_c();
    if args.no_channel {
        shutdown.await?;
    } else {
        let address = ctx.ipc_path(args.ipc_path.as_deref());
        let retry = Duration::from_millis(args.retry_ms);
        control_session(&address, retry, shutdown).await;
    }

    info!("Interrupted, shutting down");
    supervisor.shutdown().await;
    printer.abort();
    Ok(())
}

/// Print host events until the task is aborted.
fn spawn_event_printer(events: &HostEventBroadcaster) -> JoinHandle<()> {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => print_event(&event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Host event printer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn print_event(event: &HostEvent) {
    match event {
        HostEvent::ServiceAvailable { available: true } => println!("node available"),
        HostEvent::ServiceAvailable { available: false } => println!("node unavailable"),
        HostEvent::FatalError { cause, detail } => eprintln!("{detail} {cause}"),
        HostEvent::ServiceExited { classification } => println!("node exited: {classification}"),
    }
}

/// Connect (retrying), relay stdin, print replies; reconnect after a drop.
///
/// Returns once `shutdown` resolves.
async fn control_session(
    address: &std::path::Path,
    retry: Duration,
    shutdown: impl Future<Output = std::io::Result<()>>,
) {
    let channel = ControlChannel::new();
    let mut inbound = channel.subscribe();
    let relay = spawn_stdin_relay(channel.clone());
    tokio::pin!(shutdown);

    'session: loop {
        loop {
            tokio::select! {
                _ = &mut shutdown => break 'session,
                result = channel.open(address) => match result {
                    Ok(()) => {
                        println!("connected to {}", address.display());
                        break;
                    }
                    // A late Disconnected from an older link; still connected.
                    Err(ChannelError::AlreadyConnected) => break,
                    Err(e) => debug!(error = %e, "Control channel not ready, retrying"),
                },
            }
            tokio::select! {
                _ = &mut shutdown => break 'session,
                () = tokio::time::sleep(retry) => {}
            }
        }

        loop {
            tokio::select! {
                _ = &mut shutdown => break 'session,
                event = inbound.recv() => match event {
                    Some(ChannelEvent::Message(message)) => println!("{message}"),
                    Some(ChannelEvent::Disconnected) => {
                        warn!(address = %address.display(), "Control channel lost, reconnecting");
                        break;
                    }
                    None => break 'session,
                },
            }
        }
    }

    relay.abort();
    channel.close();
}

/// Forward each stdin line as one message. Blank lines are skipped.
fn spawn_stdin_relay(channel: ControlChannel) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => channel.send(line),
                Ok(None) => {
                    debug!("stdin closed, no more messages to relay");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read stdin");
                    break;
                }
            }
        }
    })
}
