//! Termination of the owned child: SIGTERM first, SIGKILL after a grace period.

use std::io;
use std::process::ExitStatus;
#[cfg(unix)]
use std::time::Duration;

use tokio::process::Child;

#[cfg(unix)]
use tokio::time::timeout;
#[cfg(unix)]
use tracing::{debug, warn};

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// How long the node gets to exit after SIGTERM.
#[cfg(unix)]
const GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Ask the node with `pid` to exit.
///
/// Unix sends SIGTERM; a process that is already gone is not an error.
/// Elsewhere there is no graceful request and [`wait_or_kill`] kills outright.
#[cfg(unix)]
pub(super) fn request_termination(pid: u32) -> io::Result<()> {
    let raw = i32::try_from(pid).map_err(io::Error::other)?;
    match signal::kill(Pid::from_raw(raw), Signal::SIGTERM) {
        Ok(()) => {
            debug!(pid, "Sent SIGTERM to node");
            Ok(())
        }
        Err(nix::errno::Errno::ESRCH) => Ok(()),
        Err(e) => Err(io::Error::other(e)),
    }
}

#[cfg(not(unix))]
pub(super) fn request_termination(_pid: u32) -> io::Result<()> {
    Ok(())
}

/// Reap `child` after a termination request, killing it once the grace
/// period runs out.
pub(super) async fn wait_or_kill(child: &mut Child) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        if let Ok(result) = timeout(GRACE_PERIOD, child.wait()).await {
            return result;
        }
        warn!(pid = ?child.id(), "Node ignored SIGTERM, killing");
    }

    child.kill().await?;
    child.wait().await
}

/// Split an exit status into `(exit code, terminating signal)`.
pub(super) fn exit_parts(status: ExitStatus) -> (Option<i32>, Option<i32>) {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        (status.code(), status.signal())
    }

    #[cfg(not(unix))]
    {
        (status.code(), None)
    }
}
