//! Events raised to the host application.
//!
//! The supervisor publishes these through a
//! [`HostEventEmitter`](crate::ports::HostEventEmitter). Transports (a UI
//! bridge, the CLI printer, a broadcast channel) decide what to do with them.

use serde::{Deserialize, Serialize};

use crate::domain::ExitClassification;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// The node became reachable, or the owned child went away.
    ServiceAvailable { available: bool },
    /// An error that should be shown to the user.
    FatalError { cause: String, detail: String },
    /// The owned child terminated.
    ServiceExited { classification: ExitClassification },
}

impl HostEvent {
    pub const fn service_available(available: bool) -> Self {
        Self::ServiceAvailable { available }
    }

    pub fn fatal_error(cause: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::FatalError {
            cause: cause.into(),
            detail: detail.into(),
        }
    }

    /// Stable event name, used by transports as a channel or topic.
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::ServiceAvailable { .. } => "service_available",
            Self::FatalError { .. } => "fatal_error",
            Self::ServiceExited { .. } => "service_exited",
        }
    }
}
