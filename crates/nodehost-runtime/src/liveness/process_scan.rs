//! Process-table liveness.

use std::ffi::{OsStr, OsString};
use std::path::Path;

use nodehost_core::{LivenessError, LivenessProbe, ServiceHandle};
use sysinfo::{Process, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};
use tracing::debug;

/// Finds a running process whose name or executable file name equals the
/// service binary's file name.
///
/// The current process is never reported, so a host whose own binary shares
/// the name does not detect itself.
#[derive(Debug, Clone)]
pub struct ProcessScanDetector {
    binary_name: OsString,
}

impl ProcessScanDetector {
    /// Match processes named exactly `binary_name` (e.g. `parity`).
    pub fn new(binary_name: impl Into<OsString>) -> Self {
        Self {
            binary_name: binary_name.into(),
        }
    }

    /// Match processes running the same file name as `binary`.
    ///
    /// Returns `None` if `binary` has no file name component.
    pub fn for_binary(binary: &Path) -> Option<Self> {
        binary.file_name().map(Self::new)
    }

    pub fn binary_name(&self) -> &OsStr {
        &self.binary_name
    }

    fn is_match(&self, process: &Process) -> bool {
        if process.name() == self.binary_name.as_os_str() {
            return true;
        }
        process
            .exe()
            .and_then(Path::file_name)
            .is_some_and(|name| name == self.binary_name.as_os_str())
    }
}

impl LivenessProbe for ProcessScanDetector {
    fn detect(&self) -> Result<Option<ServiceHandle>, LivenessError> {
        let own_pid = std::process::id();

        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_exe(UpdateKind::OnlyIfNotSet),
        );

        let found = system
            .processes()
            .iter()
            .filter(|(pid, _)| pid.as_u32() != own_pid)
            .find(|(_, process)| self.is_match(process))
            .map(|(pid, process)| ServiceHandle::new(pid.as_u32(), process.start_time()));

        if let Some(handle) = found {
            debug!(
                pid = handle.pid,
                binary = %self.binary_name.to_string_lossy(),
                "Found running instance in process table"
            );
        }
        Ok(found)
    }
}
