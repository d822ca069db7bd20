//! Per-service file locations under the data root.

use std::path::{Path, PathBuf};

use super::error::PathError;

fn checked_name(service: &str) -> Result<&str, PathError> {
    let invalid = service.is_empty()
        || service == "."
        || service == ".."
        || service.contains(['/', '\\']);
    if invalid {
        return Err(PathError::InvalidServiceName(service.to_string()));
    }
    Ok(service)
}

/// `<root>/<service>.log`
pub fn service_log_path(root: &Path, service: &str) -> Result<PathBuf, PathError> {
    Ok(root.join(format!("{}.log", checked_name(service)?)))
}

/// `<root>/<service>.lock`
pub fn default_lock_path(root: &Path, service: &str) -> Result<PathBuf, PathError> {
    Ok(root.join(format!("{}.lock", checked_name(service)?)))
}

/// Default control channel address for `service`.
///
/// A domain socket under the data root on Unix, a named pipe on Windows.
#[cfg(not(windows))]
pub fn default_ipc_path(root: &Path, service: &str) -> Result<PathBuf, PathError> {
    Ok(root.join(format!("{}.ipc", checked_name(service)?)))
}

/// Default control channel address for `service`.
///
/// A domain socket under the data root on Unix, a named pipe on Windows.
#[cfg(windows)]
pub fn default_ipc_path(_root: &Path, service: &str) -> Result<PathBuf, PathError> {
    Ok(PathBuf::from(format!(
        r"\\.\pipe\{}.ipc",
        checked_name(service)?
    )))
}
