//! Centralized path resolution for nodehost.
//!
//! All per-user files (logs, IPC endpoint, lock file) live under a single
//! data root so that several application instances agree on them.
//!
//! # Environment Variables
//!
//! - `NODEHOST_DATA_DIR`: override the data root

mod error;
mod platform;
mod resolver;
mod service;

pub use error::PathError;
pub use platform::{DATA_DIR_ENV, data_root, data_root_from};
pub use resolver::ResolvedPaths;
pub use service::{default_ipc_path, default_lock_path, service_log_path};
