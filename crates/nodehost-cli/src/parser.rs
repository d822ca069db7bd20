use clap::Parser;
use nodehost_core::DEFAULT_SERVICE_NAME;

use crate::commands::Commands;

/// Supervise a local blockchain node and talk to it over its IPC socket.
#[derive(Parser)]
#[command(name = "nodehost")]
#[command(about = "Launch, watch and control a local blockchain node")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Service identity; names the binary, log, lock and IPC files
    #[arg(
        long = "service-name",
        global = true,
        env = "NODEHOST_SERVICE_NAME",
        default_value = DEFAULT_SERVICE_NAME
    )]
    pub service_name: String,

    #[command(subcommand)]
    pub command: Commands,
}
