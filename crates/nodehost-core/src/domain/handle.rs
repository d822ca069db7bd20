//! Identity of a running node instance.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a running service instance on this machine.
///
/// Created either when the supervisor spawns a child or when a liveness
/// probe finds an instance started by someone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceHandle {
    /// OS process id.
    pub pid: u32,
    /// Unix timestamp (seconds) when the process was started or first seen.
    pub started_at: u64,
}

impl ServiceHandle {
    pub const fn new(pid: u32, started_at: u64) -> Self {
        Self { pid, started_at }
    }

    /// Handle for a process that started just now.
    pub fn started_now(pid: u32) -> Self {
        let started_at = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
        Self { pid, started_at }
    }

    /// Start time rendered as RFC 3339, if representable.
    pub fn started_at_rfc3339(&self) -> Option<String> {
        let secs = i64::try_from(self.started_at).ok()?;
        chrono::DateTime::from_timestamp(secs, 0).map(|t| t.to_rfc3339())
    }
}

impl fmt::Display for ServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid {}", self.pid)
    }
}
