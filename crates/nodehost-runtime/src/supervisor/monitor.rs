//! Termination task for the owned child.
//!
//! Nobody awaits the child directly. This task waits for it, classifies the
//! exit, updates supervisor state and tells the host.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use nodehost_core::{
    DuplicatePatterns, ExitClassification, HostEvent, LaunchError, ServiceHandle,
};
use tokio::process::Child;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::SupervisorPorts;
use super::shutdown::{exit_parts, wait_or_kill};
use super::state::SupervisorState;
use crate::liveness::{read_lock_file, remove_lock_file};
use crate::logsink::LogTail;

/// Host exit status after a fatal node exit under explicit arguments.
pub const FATAL_HOST_EXIT_CODE: i32 = 1;

/// Context passed to the error reporter for runtime failures.
pub const RUN_CONTEXT: &str = "An error occurred while running the node.";

/// Upper bound on waiting for output pumps after the child is gone.
///
/// A grandchild holding the pipes open must not stall classification.
const PUMP_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

pub(super) struct ExitWatch {
    pub child: Child,
    pub handle: ServiceHandle,
    pub pumps: Vec<JoinHandle<()>>,
    pub tail: LogTail,
    pub cancel: CancellationToken,
    pub patterns: DuplicatePatterns,
    pub explicit_args: bool,
    pub lock_path: Option<PathBuf>,
    pub ports: SupervisorPorts,
    pub state: Arc<Mutex<SupervisorState>>,
}

pub(super) async fn watch(watch: ExitWatch) {
    let ExitWatch {
        mut child,
        handle,
        pumps,
        tail,
        cancel,
        patterns,
        explicit_args,
        lock_path,
        ports,
        state,
    } = watch;
    let pid = handle.pid;

    let exited = tokio::select! {
        status = child.wait() => Some(status),
        () = cancel.cancelled() => None,
    };
    let waited = match exited {
        Some(status) => status,
        None => {
            // The termination request was sent by whoever cancelled.
            debug!(pid, "Stop requested, waiting for node to exit");
            wait_or_kill(&mut child).await
        }
    };

    // Output must be fully captured before the tail is read.
    for pump in pumps {
        if tokio::time::timeout(PUMP_DRAIN_TIMEOUT, pump).await.is_err() {
            debug!(pid, "Output still open after exit, not waiting for it");
        }
    }

    let requested = cancel.is_cancelled();
    let classification = if requested {
        ExitClassification::Clean
    } else {
        match waited {
            Ok(status) => {
                let (exit_code, signal) = exit_parts(status);
                ExitClassification::classify(exit_code, signal, &tail.last_line(), &patterns)
            }
            Err(e) => {
                warn!(pid, error = %e, "Failed to wait for node");
                ExitClassification::Fatal {
                    exit_code: None,
                    signal: None,
                }
            }
        }
    };

    if let Some(path) = &lock_path {
        release_lock_file(path, pid);
    }

    {
        let mut state = state.lock().await;
        if state.owned_pid() == Some(pid) {
            state.clear_owned();
            ports.events.emit(HostEvent::service_available(false));
        }
        if !requested {
            state.last_exit = Some(classification);
        }
    }

    match classification {
        ExitClassification::Clean => info!(pid, "Node exited"),
        ExitClassification::DuplicateInstance => {
            info!(
                pid,
                last_line = %tail.last_line(),
                "Another instance of the node is already running, closing local instance"
            );
        }
        ExitClassification::Fatal { exit_code, signal } => {
            let err = LaunchError::FatalExit { exit_code, signal };
            if explicit_args {
                error!(pid, error = %err, "Node started with explicit arguments died, terminating host");
                ports.host.exit(FATAL_HOST_EXIT_CODE);
            } else {
                ports.reporter.report(&err, RUN_CONTEXT);
            }
        }
    }

    // Emitted after every other effect of the exit.
    ports
        .events
        .emit(HostEvent::ServiceExited { classification });
}

fn release_lock_file(path: &std::path::Path, pid: u32) {
    // Only remove a lock that still names this child.
    if read_lock_file(path).ok() != Some(pid) {
        return;
    }
    if let Err(e) = remove_lock_file(path) {
        debug!(pid, path = %path.display(), error = %e, "Could not remove lock file");
    }
}
