use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::codec::MessageCodec;
use super::error::ChannelError;
use super::subscription::{ChannelEvent, MessageSubscription};
use super::transport;

/// Persistent, message-oriented client for the node's local socket.
///
/// Cheap to clone; clones share the connection, queue and subscribers. The
/// connection is torn down when the last clone is dropped.
#[derive(Clone, Default)]
pub struct ControlChannel {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    link: Mutex<LinkState>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<ChannelEvent>>>,
    /// Writer task of the latest connection. Held across `attach` so a new
    /// link only starts once the previous writer has requeued what it held.
    writer: tokio::sync::Mutex<Option<JoinHandle<()>>>,
    generation: AtomicU64,
    shutdown: CancellationToken,
}

#[derive(Default)]
struct LinkState {
    /// Messages waiting for a connection, oldest first.
    queue: VecDeque<String>,
    link: Option<Link>,
}

/// The current connection's writer side.
struct Link {
    outbound: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
    generation: u64,
}

impl ControlChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect to the node at `address` and flush queued messages.
    ///
    /// Resolves once every message queued before the call has been written.
    /// On failure the queue is left intact for a later attempt; the channel
    /// never reconnects on its own.
    pub async fn open(&self, address: impl AsRef<Path>) -> Result<(), ChannelError> {
        let address = address.as_ref();
        if self.is_connected() {
            return Err(ChannelError::AlreadyConnected);
        }

        let connection_error = |reason: String| {
            error!(address = %address.display(), %reason, "Failed to connect to control channel");
            ChannelError::Connection {
                address: address.to_path_buf(),
                reason,
            }
        };

        let stream = transport::connect(address)
            .await
            .map_err(|e| connection_error(e.to_string()))?;

        match self.attach(stream).await {
            Ok(flushed) => {
                info!(address = %address.display(), flushed, "Connected to control channel");
                Ok(())
            }
            Err(ChannelError::Transport(reason)) => Err(connection_error(reason)),
            Err(e) => Err(e),
        }
    }

    /// Run the channel over an already-established stream.
    ///
    /// Returns the number of queued messages flushed. Must be called from
    /// within a Tokio runtime.
    pub async fn attach<S>(&self, stream: S) -> Result<usize, ChannelError>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        if self.is_connected() {
            return Err(ChannelError::AlreadyConnected);
        }

        let mut writer_slot = self.inner.writer.lock().await;
        if let Some(previous) = writer_slot.take()
            && let Err(e) = previous.await
        {
            warn!(error = %e, "Previous control channel writer failed");
        }

        let (reader, writer) = tokio::io::split(stream);
        let (outbound, rx) = mpsc::unbounded_channel();
        let (flushed_tx, flushed_rx) = oneshot::channel();
        let cancel = self.inner.shutdown.child_token();
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let backlog = {
            let mut state = self.inner.lock_link();
            if state.link.is_some() {
                return Err(ChannelError::AlreadyConnected);
            }
            state.link = Some(Link {
                outbound,
                cancel: cancel.clone(),
                generation,
            });
            std::mem::take(&mut state.queue)
        };

        let weak = Arc::downgrade(&self.inner);
        *writer_slot = Some(tokio::spawn(write_loop(
            weak.clone(),
            writer,
            backlog,
            rx,
            cancel.clone(),
            generation,
            flushed_tx,
        )));
        drop(writer_slot);
        tokio::spawn(read_loop(weak, reader, cancel, generation));

        match flushed_rx.await {
            Ok(result) => result.map_err(ChannelError::Transport),
            Err(_) => Err(ChannelError::Transport(
                "writer stopped before flushing".to_string(),
            )),
        }
    }

    /// Send one message, or queue it while disconnected. Never blocks.
    ///
    /// The message must not contain a line break.
    pub fn send(&self, message: impl Into<String>) {
        let message = message.into();
        let mut state = self.inner.lock_link();

        let unsent = match &state.link {
            Some(link) => link.outbound.send(message).err().map(|e| e.0),
            None => Some(message),
        };

        // A closed writer is winding down; it clears the link and requeues
        // its own backlog ahead of this message.
        if let Some(message) = unsent {
            state.queue.push_back(message);
        }
    }

    /// Drop the current connection. Unwritten messages go back to the queue.
    pub fn close(&self) {
        let link = self.inner.lock_link().link.take();
        if let Some(link) = link {
            debug!(generation = link.generation, "Closing control channel");
            link.cancel.cancel();
        }
    }

    pub fn subscribe(&self) -> MessageSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock_subscribers().push(tx);
        MessageSubscription::new(rx)
    }

    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.inner.lock_subscribers();
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.len()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.lock_link().link.is_some()
    }

    /// Number of messages waiting for a connection.
    pub fn queued_len(&self) -> usize {
        self.inner.lock_link().queue.len()
    }
}

impl Inner {
    fn lock_link(&self) -> MutexGuard<'_, LinkState> {
        self.link.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, Vec<mpsc::UnboundedSender<ChannelEvent>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: &ChannelEvent) {
        self.lock_subscribers()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Forget connection `generation` and put `unsent` back at the queue front.
    ///
    /// Subscribers hear `Disconnected` when `generation` was still the
    /// current connection.
    fn link_lost(&self, generation: u64, unsent: Vec<String>) {
        let lost = {
            let mut state = self.lock_link();
            let current = state
                .link
                .as_ref()
                .is_some_and(|link| link.generation == generation);
            let lost = if current { state.link.take() } else { None };
            if !unsent.is_empty() {
                debug!(count = unsent.len(), "Requeueing unsent messages");
                for message in unsent.into_iter().rev() {
                    state.queue.push_front(message);
                }
            }
            lost
        };

        if let Some(link) = lost {
            link.cancel.cancel();
            self.publish(&ChannelEvent::Disconnected);
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn drain(rx: &mut mpsc::UnboundedReceiver<String>, into: &mut Vec<String>) {
    rx.close();
    while let Ok(message) = rx.try_recv() {
        into.push(message);
    }
}

/// Why a writer stopped.
enum WriterStop {
    /// Cancelled, or its link was dropped.
    Closed,
    Failed(String),
}

async fn write_loop<W>(
    inner: Weak<Inner>,
    writer: W,
    backlog: VecDeque<String>,
    mut rx: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
    generation: u64,
    flushed: oneshot::Sender<Result<usize, String>>,
) where
    W: AsyncWrite + Unpin,
{
    let mut sink = FramedWrite::new(writer, MessageCodec::new());
    let count = backlog.len();
    let mut pending = backlog;
    let mut flushed = Some(flushed);

    let stop = loop {
        let message = if let Some(message) = pending.pop_front() {
            message
        } else {
            if let Some(flushed) = flushed.take() {
                let _ = flushed.send(Ok(count));
            }
            tokio::select! {
                () = cancel.cancelled() => break WriterStop::Closed,
                message = rx.recv() => match message {
                    Some(message) => message,
                    None => break WriterStop::Closed,
                },
            }
        };

        // A write blocked on a stalled peer must not outlive the link.
        let written = tokio::select! {
            () = cancel.cancelled() => None,
            result = sink.send(message.clone()) => Some(result),
        };
        match written {
            Some(Ok(())) => {}
            Some(Err(e)) => {
                warn!(error = %e, "Control channel write failed");
                pending.push_front(message);
                break WriterStop::Failed(e.to_string());
            }
            None => {
                pending.push_front(message);
                break WriterStop::Closed;
            }
        }
    };

    let mut unsent = Vec::from(pending);
    drain(&mut rx, &mut unsent);
    if let Some(inner) = inner.upgrade() {
        inner.link_lost(generation, unsent);
    }

    if let Some(flushed) = flushed {
        let reason = match stop {
            WriterStop::Closed => "closed before the queue was flushed".to_string(),
            WriterStop::Failed(reason) => reason,
        };
        let _ = flushed.send(Err(reason));
    }
    debug!(generation, "control channel writer exiting");
}

async fn read_loop<R>(inner: Weak<Inner>, reader: R, cancel: CancellationToken, generation: u64)
where
    R: AsyncRead + Unpin,
{
    let mut frames = FramedRead::new(reader, MessageCodec::new());

    loop {
        let frame = tokio::select! {
            () = cancel.cancelled() => {
                debug!(generation, "control channel reader cancelled");
                return;
            }
            frame = frames.next() => frame,
        };

        match frame {
            Some(Ok(message)) => {
                let Some(inner) = inner.upgrade() else { return };
                inner.publish(&ChannelEvent::Message(message));
            }
            Some(Err(e)) => {
                warn!(error = %e, "Control channel read failed");
                break;
            }
            None => {
                debug!(generation, "Control channel closed by peer");
                break;
            }
        }
    }

    if let Some(inner) = inner.upgrade() {
        inner.link_lost(generation, Vec::new());
    }
}
