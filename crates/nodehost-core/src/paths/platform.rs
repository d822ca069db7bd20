//! Platform data directory resolution.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::PathError;

/// Environment variable overriding the data root.
pub const DATA_DIR_ENV: &str = "NODEHOST_DATA_DIR";

const APP_DIR_NAME: &str = "nodehost";

/// Get the root directory for per-user application data.
///
/// Resolution order:
/// 1. `NODEHOST_DATA_DIR` environment variable
/// 2. System data directory (e.g., `~/.local/share/nodehost`)
///
/// The directory is created if missing.
pub fn data_root() -> Result<PathBuf, PathError> {
    let root = match env::var_os(DATA_DIR_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => dirs::data_local_dir()
            .ok_or(PathError::NoDataDir)?
            .join(APP_DIR_NAME),
    };
    data_root_from(&root)
}

/// Ensure `root` exists and is a directory, returning it.
pub fn data_root_from(root: &Path) -> Result<PathBuf, PathError> {
    if root.exists() {
        if !root.is_dir() {
            return Err(PathError::NotADirectory(root.to_path_buf()));
        }
    } else {
        debug!(path = %root.display(), "Creating data directory");
        fs::create_dir_all(root).map_err(|e| PathError::CreateFailed {
            path: root.to_path_buf(),
            reason: e.to_string(),
        })?;
    }
    Ok(root.to_path_buf())
}
