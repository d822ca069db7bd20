use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ExitClassification, ServiceHandle};

/// What the supervisor currently knows about its owned child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ServiceStatus {
    /// No child has been started, or the last one was stopped by the host.
    Stopped,
    Running { handle: ServiceHandle },
    /// The last owned child terminated on its own.
    Exited { classification: ExitClassification },
}

impl ServiceStatus {
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Running { handle } => write!(f, "running ({handle})"),
            Self::Exited { classification } => write!(f, "exited: {classification}"),
        }
    }
}
