use crate::domain::LaunchError;

/// Receives errors the user should hear about.
///
/// Fire-and-forget: the supervisor never waits on or inspects the result.
pub trait ErrorReporter: Send + Sync {
    /// Report `error`, with `context` describing what was being attempted.
    fn report(&self, error: &LaunchError, context: &str);
}

/// Discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl ErrorReporter for NoopReporter {
    fn report(&self, _error: &LaunchError, _context: &str) {}
}
