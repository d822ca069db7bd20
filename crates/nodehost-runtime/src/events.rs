//! Host event broadcasting.
//!
//! Fans [`HostEvent`]s out to any number of in-process listeners (the CLI
//! printer, a UI bridge, tests).

use std::sync::{Arc, LazyLock};

use nodehost_core::{HostEvent, HostEventEmitter};
use tokio::sync::broadcast;
use tracing::debug;

/// Availability and exit events a slow listener may fall behind by before
/// it starts missing them.
const EVENT_BACKLOG: usize = 64;

/// Process-wide bus shared by every supervisor the host creates.
static HOST_EVENTS: LazyLock<Arc<HostEventBroadcaster>> =
    LazyLock::new(|| Arc::new(HostEventBroadcaster::new()));

/// The process-wide host event bus.
pub fn get_host_event_broadcaster() -> Arc<HostEventBroadcaster> {
    Arc::clone(&HOST_EVENTS)
}

/// [`HostEventEmitter`] that fans node availability, exit and fatal-error
/// events out to every listener subscribed at the time.
pub struct HostEventBroadcaster {
    sender: broadcast::Sender<HostEvent>,
}

impl HostEventBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_BACKLOG);
        Self { sender }
    }

    /// Listen for events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.sender.subscribe()
    }

    /// Listeners currently attached (the CLI printer, UI bridges, tests).
    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for HostEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl HostEventEmitter for HostEventBroadcaster {
    fn emit(&self, event: HostEvent) {
        // A node can come and go before anything listens.
        if self.sender.receiver_count() > 0 {
            debug!(event = event.event_name(), "Broadcasting host event");
            let _ = self.sender.send(event);
        }
    }
}
