//! Line-framed control channel to the running node.
//!
//! Messages are UTF-8 text terminated by `\r\n` on the wire. Inbound bytes
//! are split on line breaks regardless of how they were chunked. Outbound
//! messages sent while disconnected are queued and flushed, in order, by the
//! next successful [`ControlChannel::open`].
//!
//! There is no acknowledgement protocol: a message written just before the
//! transport fails may or may not have reached the node.

mod client;
mod codec;
mod error;
mod jsonrpc;
mod subscription;
mod transport;

pub use client::ControlChannel;
pub use codec::{DEFAULT_MAX_MESSAGE_LENGTH, DELIMITER, MessageCodec};
pub use error::ChannelError;
pub use jsonrpc::{JsonRpcErrorObject, JsonRpcRequest, JsonRpcResponse};
pub use subscription::{ChannelEvent, MessageSubscription};
pub use transport::connect;
