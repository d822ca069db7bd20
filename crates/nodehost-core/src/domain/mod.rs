//! Domain types for supervised node instances.

mod error;
mod exit;
mod handle;
mod outcome;
mod status;

pub use error::LaunchError;
pub use exit::ExitClassification;
pub use handle::ServiceHandle;
pub use outcome::LaunchOutcome;
pub use status::ServiceStatus;
