//! Detection of an already-running node instance.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::ServiceHandle;

/// Unrecoverable failure while inspecting OS state.
#[derive(Debug, Error)]
pub enum LivenessError {
    /// The process table could not be read.
    #[error("Failed to query processes: {0}")]
    ProcessQuery(String),

    /// A lock file exists but could not be read.
    #[error("Failed to read lock file {path}: {reason}")]
    LockFile { path: PathBuf, reason: String },
}

/// Determines whether the target service is already running.
///
/// Implementations are purely observational: they never touch supervisor
/// state. They are synchronous because OS queries block; async callers run
/// them on a blocking thread.
pub trait LivenessProbe: Send + Sync {
    /// Return the handle of a running instance, or `None`.
    fn detect(&self) -> Result<Option<ServiceHandle>, LivenessError>;
}

/// A probe that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProbe;

impl LivenessProbe for NoopProbe {
    fn detect(&self) -> Result<Option<ServiceHandle>, LivenessError> {
        Ok(None)
    }
}
