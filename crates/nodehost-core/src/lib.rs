//! Core domain types and port definitions for nodehost.
//!
//! This crate knows nothing about processes, files or sockets. It defines
//! the vocabulary shared by the runtime adapters and the CLI:
//!
//! - [`domain`]: service handles, launch outcomes, exit classification
//! - [`config`]: launch configuration and duplicate-instance patterns
//! - [`events`]: events raised to the host application
//! - [`ports`]: traits the supervisor calls out through
//! - [`paths`]: per-user data directory conventions

pub mod config;
pub mod domain;
pub mod events;
pub mod paths;
pub mod ports;

pub use config::{DEFAULT_SERVICE_NAME, DuplicatePatterns, LaunchConfig};
pub use domain::{
    ExitClassification, LaunchError, LaunchOutcome, ServiceHandle, ServiceStatus,
};
pub use events::HostEvent;
pub use paths::{
    PathError, ResolvedPaths, data_root, default_ipc_path, default_lock_path, service_log_path,
};
pub use ports::{
    ErrorReporter, HostControl, HostEventEmitter, LivenessError, LivenessProbe, NoopEmitter,
    NoopProbe, NoopReporter,
};
