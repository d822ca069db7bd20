//! Lock-file liveness and the pid file the supervisor leaves for others.
//!
//! Format: the first line holds the pid. Anything after it is ignored.
//! ```text
//! <pid>
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use nodehost_core::{LivenessError, LivenessProbe, ServiceHandle};
use tracing::debug;

/// Detects an instance by the pid recorded in a lock file.
///
/// A missing file, an unparsable first line or a dead pid all mean
/// "not running". Only an unreadable existing file is an error.
#[derive(Debug, Clone)]
pub struct LockFileDetector {
    path: PathBuf,
}

impl LockFileDetector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LivenessProbe for LockFileDetector {
    fn detect(&self) -> Result<Option<ServiceHandle>, LivenessError> {
        let pid = match read_lock_file(&self.path) {
            Ok(pid) => pid,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                debug!(path = %self.path.display(), error = %e, "Ignoring malformed lock file");
                return Ok(None);
            }
            Err(e) => {
                return Err(LivenessError::LockFile {
                    path: self.path.clone(),
                    reason: e.to_string(),
                });
            }
        };

        if !pid_exists(pid) {
            debug!(pid, path = %self.path.display(), "Lock file points at a dead process");
            return Ok(None);
        }

        let started_at = fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_secs());

        Ok(Some(ServiceHandle::new(pid, started_at)))
    }
}

/// Read the pid from a lock file.
///
/// Returns `InvalidData` if the first line is not a positive pid.
pub fn read_lock_file(path: &Path) -> io::Result<u32> {
    let content = fs::read_to_string(path)?;
    content
        .lines()
        .next()
        .and_then(|line| line.trim().parse::<u32>().ok())
        .filter(|pid| *pid != 0)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "missing or invalid PID"))
}

/// Write a lock file atomically using temp file + rename.
pub fn write_lock_file(path: &Path, pid: u32) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    fs::write(&temp, format!("{pid}\n"))?;
    fs::rename(&temp, path)
}

/// Delete a lock file (idempotent - no error if missing).
pub fn remove_lock_file(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Check whether a process with `pid` exists.
#[cfg(unix)]
pub fn pid_exists(pid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    // Null signal: permission checks only, nothing is delivered.
    match signal::kill(Pid::from_raw(raw), None) {
        Ok(()) | Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

/// Check whether a process with `pid` exists.
#[cfg(not(unix))]
pub fn pid_exists(pid: u32) -> bool {
    use sysinfo::{Pid, ProcessesToUpdate, System};

    let pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    system.process(pid).is_some()
}
