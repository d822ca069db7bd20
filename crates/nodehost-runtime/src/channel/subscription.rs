use tokio::sync::mpsc;

/// What subscribers of a [`ControlChannel`](super::ControlChannel) see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// One complete inbound message, without its terminator.
    Message(String),
    /// The transport went away; sends are queued until the next `open()`.
    Disconnected,
}

/// A live subscription. Dropping it unsubscribes.
///
/// Every subscriber gets every event, in arrival order.
#[derive(Debug)]
pub struct MessageSubscription {
    rx: mpsc::UnboundedReceiver<ChannelEvent>,
}

impl MessageSubscription {
    pub(super) const fn new(rx: mpsc::UnboundedReceiver<ChannelEvent>) -> Self {
        Self { rx }
    }

    /// Next event, or `None` once the channel itself is gone.
    pub async fn recv(&mut self) -> Option<ChannelEvent> {
        self.rx.recv().await
    }

    /// Next inbound message, skipping disconnect notices.
    pub async fn next_message(&mut self) -> Option<String> {
        loop {
            match self.rx.recv().await? {
                ChannelEvent::Message(message) => return Some(message),
                ChannelEvent::Disconnected => {}
            }
        }
    }

    /// Next event if one is already waiting.
    pub fn try_recv(&mut self) -> Option<ChannelEvent> {
        self.rx.try_recv().ok()
    }
}
