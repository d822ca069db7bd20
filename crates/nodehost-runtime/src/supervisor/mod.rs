//! Node process supervisor.
//!
//! The [`Supervisor`] owns at most one node child at a time. It decides
//! whether to launch at all (configuration, liveness), spawns the child with
//! its output teed into a [`LogSink`], and hands the child to a monitor task
//! that classifies the eventual exit.
//!
//! Key design decisions:
//! - **Fire-and-forget spawn**: `start()` never waits for the node to be ready
//! - **Serialized starts**: the state lock is held for the whole attempt, so
//!   concurrent callers see the owned child instead of spawning another
//! - **Guarded construction**: one supervisor per service name per process
//! - **Signal on stop**: `stop()` and drop send SIGTERM themselves, so the
//!   node is asked to exit even if the runtime goes away right after

mod error;
mod monitor;
mod permissions;
mod registry;
mod shutdown;
mod state;
mod stream;

use std::process::Stdio;
use std::sync::Arc;

use nodehost_core::{
    ErrorReporter, HostControl, HostEvent, HostEventEmitter, LaunchConfig, LaunchError,
    LaunchOutcome, LivenessProbe, NoopEmitter, NoopReporter, ServiceHandle, ServiceStatus,
};
use tokio::process::Command;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::liveness::write_lock_file;
use crate::logsink::LogSink;

pub use error::SupervisorError;

pub use monitor::{FATAL_HOST_EXIT_CODE, RUN_CONTEXT};

use monitor::ExitWatch;
use registry::Registration;
use state::{OwnedChild, SupervisorState};

/// Context passed to the error reporter for launch failures.
pub const LAUNCH_CONTEXT: &str = "An error occurred while starting the node.";

/// Collaborators the supervisor calls out to.
#[derive(Clone)]
pub struct SupervisorPorts {
    pub liveness: Arc<dyn LivenessProbe>,
    pub reporter: Arc<dyn ErrorReporter>,
    pub events: Arc<dyn HostEventEmitter>,
    pub host: Arc<dyn HostControl>,
}

impl SupervisorPorts {
    /// Ports with no-op reporting and events.
    pub fn new(liveness: Arc<dyn LivenessProbe>, host: Arc<dyn HostControl>) -> Self {
        Self {
            liveness,
            reporter: Arc::new(NoopReporter),
            events: Arc::new(NoopEmitter::new()),
            host,
        }
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn HostEventEmitter>) -> Self {
        self.events = events;
        self
    }
}

/// Launches and watches the node for one service identity.
pub struct Supervisor {
    config: LaunchConfig,
    ports: SupervisorPorts,
    state: Arc<Mutex<SupervisorState>>,
    _registration: Registration,
}

impl Supervisor {
    /// Create the supervisor for `config.service_name`.
    ///
    /// Fails if another supervisor for the same service is alive in this
    /// process.
    pub fn new(config: LaunchConfig, ports: SupervisorPorts) -> Result<Self, SupervisorError> {
        let registration = Registration::acquire(&config.service_name)?;
        Ok(Self {
            config,
            ports,
            state: Arc::new(Mutex::new(SupervisorState::default())),
            _registration: registration,
        })
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    /// Run one launch attempt.
    ///
    /// While a child is owned this returns `Started` with its handle and
    /// spawns nothing. Failed attempts are also handed to the error reporter.
    pub async fn start(&self) -> LaunchOutcome {
        let mut state = self.state.lock().await;
        let outcome = self.launch(&mut state).await;

        if let LaunchOutcome::Failed { cause } = &outcome {
            warn!(service = %self.config.service_name, error = %cause, "Node launch failed");
            self.ports.reporter.report(cause, LAUNCH_CONTEXT);
        }
        state.last_outcome = Some(outcome.clone());
        outcome
    }

    async fn launch(&self, state: &mut SupervisorState) -> LaunchOutcome {
        let config = &self.config;

        if config.skip_launch {
            info!(service = %config.service_name, "Launching disabled by configuration, skipping");
            return LaunchOutcome::Skipped;
        }

        if let Some(owned) = state.live_owned() {
            debug!(pid = owned.handle.pid, "Node already owned, not spawning another");
            return LaunchOutcome::Started {
                handle: owned.handle,
            };
        }

        match self.detect_running().await {
            Ok(Some(handle)) => {
                info!(
                    pid = handle.pid,
                    "Another instance of the node is already running, skip running local instance"
                );
                return LaunchOutcome::AlreadyRunning { handle };
            }
            Ok(None) => {}
            Err(cause) => return LaunchOutcome::Failed { cause },
        }

        let Some(binary) = config.binary_path.clone() else {
            return LaunchOutcome::Failed {
                cause: LaunchError::binary_path_unresolved(),
            };
        };

        permissions::ensure_executable(&binary).await;

        let sink = match LogSink::open(&config.log_path).await {
            Ok(sink) => sink,
            Err(e) => {
                return LaunchOutcome::Failed {
                    cause: LaunchError::LogSink {
                        path: config.log_path.clone(),
                        reason: e.to_string(),
                    },
                };
            }
        };

        let mut command = Command::new(&binary);
        command
            .args(&config.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let spawn_failed = |reason: String| LaunchOutcome::Failed {
            cause: LaunchError::Spawn {
                binary: binary.clone(),
                reason,
            },
        };

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => return spawn_failed(e.to_string()),
        };
        let Some(pid) = child.id() else {
            return spawn_failed("child exited before reporting a pid".to_string());
        };
        let handle = ServiceHandle::started_now(pid);

        info!(
            pid,
            binary = %binary.display(),
            args = ?config.args,
            log = %config.log_path.display(),
            "Running node"
        );

        let mut pumps = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            pumps.push(stream::spawn_output_pump(stdout, pid, "stdout", sink.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            pumps.push(stream::spawn_output_pump(stderr, pid, "stderr", sink.clone()));
        }

        if let Some(lock_path) = &config.lock_path
            && let Err(e) = write_lock_file(lock_path, pid)
        {
            warn!(pid, path = %lock_path.display(), error = %e, "Failed to write lock file");
        }

        let cancel = CancellationToken::new();
        let monitor = tokio::spawn(monitor::watch(ExitWatch {
            child,
            handle,
            pumps,
            tail: sink.tail().clone(),
            cancel: cancel.clone(),
            patterns: config.duplicate_patterns.clone(),
            explicit_args: config.has_explicit_args(),
            lock_path: config.lock_path.clone(),
            ports: self.ports.clone(),
            state: Arc::clone(&self.state),
        }));

        state.owned = Some(OwnedChild {
            handle,
            cancel,
            monitor,
        });
        state.last_exit = None;

        // Still under the state lock: the monitor cannot report the exit first.
        self.ports.events.emit(HostEvent::service_available(true));

        LaunchOutcome::Started { handle }
    }

    async fn detect_running(&self) -> Result<Option<ServiceHandle>, LaunchError> {
        let probe = Arc::clone(&self.ports.liveness);
        tokio::task::spawn_blocking(move || probe.detect())
            .await
            .map_err(|e| LaunchError::Liveness {
                message: e.to_string(),
            })?
            .map_err(|e| LaunchError::Liveness {
                message: e.to_string(),
            })
    }

    /// Ask the owned child to terminate and forget it.
    ///
    /// SIGTERM is sent before this returns; the monitor escalates to SIGKILL
    /// if the node outlives the grace period. Does not wait for the exit. A
    /// no-op when nothing is owned.
    pub async fn stop(&self) {
        // Detached: the monitor finishes on its own.
        drop(self.stop_owned().await);
    }

    /// Like [`stop`](Self::stop), but waits until the child has exited and
    /// its exit has been handled (lock file released, events emitted).
    pub async fn shutdown(&self) {
        if let Some(monitor) = self.stop_owned().await
            && let Err(e) = monitor.await
        {
            warn!(error = %e, "Node monitor task failed");
        }
    }

    async fn stop_owned(&self) -> Option<JoinHandle<()>> {
        let mut state = self.state.lock().await;
        let Some(owned) = state.clear_owned() else {
            debug!(service = %self.config.service_name, "No owned node to stop");
            return None;
        };

        info!(pid = owned.handle.pid, "Stopping node");
        request_stop(&owned);
        state.last_exit = None;
        self.ports.events.emit(HostEvent::service_available(false));
        Some(owned.monitor)
    }

    /// Outcome of the most recent `start()`.
    pub async fn last_outcome(&self) -> Option<LaunchOutcome> {
        self.state.lock().await.last_outcome.clone()
    }

    pub async fn status(&self) -> ServiceStatus {
        self.state.lock().await.status()
    }

    /// Handle of the owned child, if one is running.
    pub async fn owned_handle(&self) -> Option<ServiceHandle> {
        self.state.lock().await.live_owned().map(|o| o.handle)
    }

    pub async fn is_running(&self) -> bool {
        self.status().await.is_running()
    }
}

/// Signal the child, then hand the rest of the teardown to its monitor.
fn request_stop(owned: &OwnedChild) {
    if let Err(e) = shutdown::request_termination(owned.handle.pid) {
        warn!(pid = owned.handle.pid, error = %e, "Failed to signal node");
    }
    owned.cancel.cancel();
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_lock()
            && let Some(owned) = state.clear_owned()
        {
            request_stop(&owned);
        }
    }
}
