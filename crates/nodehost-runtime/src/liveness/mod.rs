//! Liveness probes.
//!
//! Each probe implements [`LivenessProbe`](nodehost_core::LivenessProbe).
//! Combine them with [`AnyDetector`] when more than one signal is available.

mod any;
mod lockfile;
mod process_scan;

pub use any::AnyDetector;
pub use lockfile::{LockFileDetector, pid_exists, read_lock_file, remove_lock_file, write_lock_file};
pub use process_scan::ProcessScanDetector;
