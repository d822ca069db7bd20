//! nodehost command-line adapter.
//!
//! Parses arguments, wires the runtime's concrete adapters into a
//! [`Supervisor`](nodehost_runtime::Supervisor) and a
//! [`ControlChannel`](nodehost_runtime::ControlChannel), and prints what
//! happens. `main.rs` only dispatches.

// tracing-subscriber is initialized in main.rs
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

pub use commands::{Commands, NodeArgs, RunArgs, SendArgs};
pub use error::CliError;
pub use parser::Cli;
