use nodehost_core::{ExitClassification, LaunchOutcome, ServiceHandle, ServiceStatus};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// The child this supervisor spawned and still owns.
pub(super) struct OwnedChild {
    pub handle: ServiceHandle,
    /// Cancelled to ask the monitor to terminate the child.
    pub cancel: CancellationToken,
    pub monitor: JoinHandle<()>,
}

#[derive(Default)]
pub(super) struct SupervisorState {
    pub owned: Option<OwnedChild>,
    pub last_outcome: Option<LaunchOutcome>,
    /// Classification of the last owned child that exited on its own.
    pub last_exit: Option<ExitClassification>,
}

impl SupervisorState {
    pub fn owned_pid(&self) -> Option<u32> {
        self.owned.as_ref().map(|o| o.handle.pid)
    }

    /// The owned child, if its monitor is still running.
    pub fn live_owned(&self) -> Option<&OwnedChild> {
        self.owned.as_ref().filter(|o| !o.monitor.is_finished())
    }

    pub fn clear_owned(&mut self) -> Option<OwnedChild> {
        self.owned.take()
    }

    pub fn status(&self) -> ServiceStatus {
        if let Some(owned) = self.live_owned() {
            return ServiceStatus::Running {
                handle: owned.handle,
            };
        }
        match self.last_exit {
            Some(classification) => ServiceStatus::Exited { classification },
            None => ServiceStatus::Stopped,
        }
    }
}
