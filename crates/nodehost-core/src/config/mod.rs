//! Launch configuration supplied by the host application.

mod launch;
mod patterns;

pub use launch::{DEFAULT_SERVICE_NAME, LaunchConfig};
pub use patterns::DuplicatePatterns;
