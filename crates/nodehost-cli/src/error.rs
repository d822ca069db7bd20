//! CLI-specific error types and exit codes.

use nodehost_core::PathError;
use nodehost_runtime::{ChannelError, SupervisorError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Core(String),

    #[error("Invalid arguments: {0}")]
    Arguments(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The node could not be launched or kept running.
    #[error("Process error: {0}")]
    Process(String),

    /// The node's control socket is not reachable.
    #[error("Node unavailable: {0}")]
    Unavailable(String),

    #[error("Timed out: {0}")]
    Timeout(String),
}

impl CliError {
    /// Map error to an exit code (sysexits.h where one fits).
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Core(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Unavailable(_) => 69, // EX_UNAVAILABLE
            Self::Process(_) => 71, // EX_OSERR
            Self::Io(_) => 74, // EX_IOERR
            Self::Timeout(_) => 75, // EX_TEMPFAIL
            Self::Config(_) => 78, // EX_CONFIG
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<SupervisorError> for CliError {
    fn from(err: SupervisorError) -> Self {
        Self::Process(err.to_string())
    }
}

impl From<ChannelError> for CliError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::Connection { .. } => Self::Unavailable(err.to_string()),
            ChannelError::AlreadyConnected | ChannelError::Transport(_) => {
                Self::Core(err.to_string())
            }
        }
    }
}

/// Exit code for an error that reached `main`.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<CliError>().map_or(1, CliError::exit_code)
}
