//! Resolved per-service paths, for display and wiring.

use std::fmt;
use std::path::{Path, PathBuf};

use super::error::PathError;
use super::service::{default_ipc_path, default_lock_path, service_log_path};

/// Every file location nodehost uses for one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub data_root: PathBuf,
    pub log_path: PathBuf,
    pub ipc_path: PathBuf,
    pub lock_path: PathBuf,
}

impl ResolvedPaths {
    /// Resolve all paths for `service` under `root`.
    pub fn for_service(root: &Path, service: &str) -> Result<Self, PathError> {
        Ok(Self {
            data_root: root.to_path_buf(),
            log_path: service_log_path(root, service)?,
            ipc_path: default_ipc_path(root, service)?,
            lock_path: default_lock_path(root, service)?,
        })
    }
}

impl fmt::Display for ResolvedPaths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "data_root = {}", self.data_root.display())?;
        writeln!(f, "log_path  = {}", self.log_path.display())?;
        writeln!(f, "ipc_path  = {}", self.ipc_path.display())?;
        write!(f, "lock_path = {}", self.lock_path.display())
    }
}
