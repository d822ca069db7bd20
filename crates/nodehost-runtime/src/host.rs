use nodehost_core::HostControl;
use tracing::warn;

/// Terminates the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExit;

impl HostControl for ProcessExit {
    fn exit(&self, code: i32) {
        warn!(code, "Terminating host application");
        std::process::exit(code);
    }
}
