//! Event emitter trait for host notifications.

use crate::events::HostEvent;

/// Publishes [`HostEvent`]s to whoever is listening.
///
/// # Implementations
///
/// - `NoopEmitter` - for tests and contexts without listeners
/// - `HostEventBroadcaster` in `nodehost-runtime`
pub trait HostEventEmitter: Send + Sync {
    /// Emit an event. Must not block.
    fn emit(&self, event: HostEvent);
}

/// A no-op event emitter for tests and CLI contexts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEmitter;

impl NoopEmitter {
    pub const fn new() -> Self {
        Self
    }
}

impl HostEventEmitter for NoopEmitter {
    fn emit(&self, _event: HostEvent) {}
}
