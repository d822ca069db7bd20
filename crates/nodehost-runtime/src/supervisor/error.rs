use thiserror::Error;

/// Error from constructing a supervisor.
///
/// Launch failures are not errors here: they are reported through
/// [`LaunchOutcome::Failed`](nodehost_core::LaunchOutcome::Failed).
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// Another supervisor in this process already owns the service.
    #[error("Service '{0}' already has a supervisor in this process")]
    AlreadySupervised(String),

    #[error("Service name cannot be empty")]
    EmptyServiceName,
}
