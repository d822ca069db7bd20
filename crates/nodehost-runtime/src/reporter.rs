//! Error reporter that logs and forwards to the host.

use std::sync::Arc;

use nodehost_core::{ErrorReporter, HostEvent, HostEventEmitter, LaunchError};
use tracing::error;

/// Logs every report at `error` level and, when an emitter is attached,
/// raises a [`HostEvent::FatalError`] so the host can show it.
#[derive(Clone, Default)]
pub struct TracingReporter {
    events: Option<Arc<dyn HostEventEmitter>>,
}

impl TracingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn HostEventEmitter>) -> Self {
        self.events = Some(events);
        self
    }
}

impl ErrorReporter for TracingReporter {
    fn report(&self, err: &LaunchError, context: &str) {
        error!(error = %err, context, "Node error");
        if let Some(events) = &self.events {
            events.emit(HostEvent::fatal_error(err.to_string(), context));
        }
    }
}
