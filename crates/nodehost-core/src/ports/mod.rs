//! Port definitions (trait abstractions) for nodehost.
//!
//! The supervisor calls out through these traits; concrete implementations
//! live in `nodehost-runtime` (OS access) and in the host application.
//!
//! # Design Rules
//!
//! - No process, filesystem or socket details in signatures
//! - Traits are object-safe and used as `Arc<dyn Trait>`
//! - Fire-and-forget ports return `()`; adapters handle their own failures

mod error_reporter;
mod event_emitter;
mod host_control;
mod liveness;

pub use error_reporter::{ErrorReporter, NoopReporter};
pub use event_emitter::{HostEventEmitter, NoopEmitter};
pub use host_control::HostControl;
pub use liveness::{LivenessError, LivenessProbe, NoopProbe};
