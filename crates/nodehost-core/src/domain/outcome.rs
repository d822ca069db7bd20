use std::fmt;

use serde::{Deserialize, Serialize};

use super::{LaunchError, ServiceHandle};

/// Result of one supervised launch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LaunchOutcome {
    /// Another instance was found; nothing was spawned.
    AlreadyRunning { handle: ServiceHandle },
    /// A child was spawned (or one is already owned by this supervisor).
    Started { handle: ServiceHandle },
    /// Launching is disabled by configuration.
    Skipped,
    /// The attempt failed before a child was running.
    Failed { cause: LaunchError },
}

impl LaunchOutcome {
    /// Handle of the instance the host should talk to, if any.
    pub const fn handle(&self) -> Option<ServiceHandle> {
        match self {
            Self::AlreadyRunning { handle } | Self::Started { handle } => Some(*handle),
            Self::Skipped | Self::Failed { .. } => None,
        }
    }

    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Whether a node instance is available after this attempt.
    pub const fn service_available(&self) -> bool {
        self.handle().is_some()
    }
}

impl fmt::Display for LaunchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRunning { handle } => write!(f, "already running ({handle})"),
            Self::Started { handle } => write!(f, "started ({handle})"),
            Self::Skipped => write!(f, "skipped"),
            Self::Failed { cause } => write!(f, "failed: {cause}"),
        }
    }
}
