//! OS-level adapters for nodehost.
//!
//! - [`liveness`]: detect an instance started by someone else
//! - [`logsink`]: rotate and tee the node's combined output
//! - [`supervisor`]: launch, watch and stop the owned node child
//! - [`channel`]: line-framed control channel over a local socket
//! - [`events`], [`reporter`], [`host`]: production implementations of the
//!   core ports

pub mod channel;
pub mod events;
pub mod host;
pub mod liveness;
pub mod logsink;
pub mod reporter;
pub mod supervisor;

pub use channel::{
    ChannelError, ChannelEvent, ControlChannel, JsonRpcRequest, JsonRpcResponse,
    MessageCodec, MessageSubscription,
};
pub use events::{HostEventBroadcaster, get_host_event_broadcaster};
pub use host::ProcessExit;
pub use liveness::{AnyDetector, LockFileDetector, ProcessScanDetector};
pub use logsink::{LogSink, LogTail};
pub use reporter::TracingReporter;
pub use supervisor::{Supervisor, SupervisorError, SupervisorPorts};
