//! Errors raised while launching or running the node.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a launch attempt failed, or why a running node was reported.
///
/// Carried by [`LaunchOutcome::Failed`](super::LaunchOutcome::Failed) and
/// handed to the [`ErrorReporter`](crate::ports::ErrorReporter). Fields are
/// stringly so the value can be cloned, compared and serialized.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LaunchError {
    /// The launch configuration cannot be acted on (e.g. no binary path).
    #[error("{message}")]
    Configuration { message: String },

    /// The liveness probe could not query the OS.
    #[error("Liveness check failed: {message}")]
    Liveness { message: String },

    /// The log file could not be opened.
    #[error("Failed to open log file {path}: {reason}")]
    LogSink { path: PathBuf, reason: String },

    /// The OS refused to create the child process.
    #[error("Failed to spawn {binary}: {reason}")]
    Spawn { binary: PathBuf, reason: String },

    /// The child exited nonzero or was signalled, with no benign explanation.
    #[error(
        "Exit code {}, with signal {}.",
        display_or_null(.exit_code),
        display_or_null(.signal)
    )]
    FatalExit {
        exit_code: Option<i32>,
        signal: Option<i32>,
    },
}

impl LaunchError {
    /// The node binary location is not known.
    pub fn binary_path_unresolved() -> Self {
        Self::Configuration {
            message: "binary path unresolved".to_string(),
        }
    }

    /// Whether this error came from the running child rather than the launch.
    pub const fn is_runtime(&self) -> bool {
        matches!(self, Self::FatalExit { .. })
    }
}

#[allow(clippy::ref_option)]
fn display_or_null(value: &Option<i32>) -> String {
    value.map_or_else(|| "null".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_exit_message_names_code_and_signal() {
        let err = LaunchError::FatalExit {
            exit_code: Some(1),
            signal: None,
        };
        assert_eq!(err.to_string(), "Exit code 1, with signal null.");
        assert!(err.is_runtime());
    }

    #[test]
    fn unresolved_binary_is_configuration_error() {
        let err = LaunchError::binary_path_unresolved();
        assert_eq!(err.to_string(), "binary path unresolved");
        assert!(!err.is_runtime());
    }

    #[test]
    fn serializes_with_kind_tag() {
        let err = LaunchError::Spawn {
            binary: PathBuf::from("/opt/node"),
            reason: "permission denied".into(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "spawn");
        assert_eq!(json["binary"], "/opt/node");
    }
}
