use std::path::PathBuf;

use clap::{Args, Subcommand};

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the node (or adopt a running one) and relay stdin to its IPC socket
    Run(RunArgs),
    /// Report whether an instance of the node is running
    Status(NodeArgs),
    /// Send one message to the node and print the first reply
    Send(SendArgs),
    /// Show resolved data, log, lock and IPC paths
    Paths,
}

/// Where to find the node binary and its lock file.
#[derive(Args, Debug, Clone, Default)]
pub struct NodeArgs {
    /// Node executable; looked up on PATH by service name when omitted
    #[arg(long = "node-path", env = "NODEHOST_NODE_PATH")]
    pub node_path: Option<PathBuf>,

    /// Pid lock file shared by every host of this service
    #[arg(long = "lock-path")]
    pub lock_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub node: NodeArgs,

    /// Never launch the node; only connect to one started elsewhere
    #[arg(long = "no-run-node", env = "NODEHOST_NO_RUN_NODE")]
    pub no_run_node: bool,

    /// Node log file, truncated on every launch
    #[arg(long = "log-path")]
    pub log_path: Option<PathBuf>,

    /// Control socket of the node
    #[arg(long = "ipc-path")]
    pub ipc_path: Option<PathBuf>,

    /// Extra last-line substring that marks a duplicate-instance exit
    #[arg(long = "duplicate-pattern", value_name = "TEXT")]
    pub duplicate_patterns: Vec<String>,

    /// Supervise only; do not open the control channel
    #[arg(long = "no-channel")]
    pub no_channel: bool,

    /// Delay between control channel connection attempts
    #[arg(long = "retry-ms", default_value_t = 1000)]
    pub retry_ms: u64,

    /// Arguments passed to the node verbatim
    #[arg(last = true, value_name = "NODE_ARGS")]
    pub node_args: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SendArgs {
    /// Raw message, written as one `\r\n`-terminated line
    #[arg(required_unless_present = "method", conflicts_with = "method")]
    pub message: Option<String>,

    /// Build a JSON-RPC request for this method instead of a raw message
    #[arg(long)]
    pub method: Option<String>,

    /// JSON params for --method
    #[arg(long, default_value = "[]")]
    pub params: String,

    /// Control socket of the node
    #[arg(long = "ipc-path")]
    pub ipc_path: Option<PathBuf>,

    /// Seconds to wait for a reply
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,
}
