use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    /// The transport could not be established, or failed while flushing.
    ///
    /// Queued messages are kept for the next `open()`.
    #[error("Failed to connect to {address}: {reason}")]
    Connection { address: PathBuf, reason: String },

    #[error("Control channel is already connected")]
    AlreadyConnected,

    /// An attached stream failed while flushing the queue.
    #[error("Control channel transport failed: {0}")]
    Transport(String),
}
