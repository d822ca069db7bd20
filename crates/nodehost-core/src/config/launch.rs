use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::DuplicatePatterns;

/// Service identity used when the host does not name one.
pub const DEFAULT_SERVICE_NAME: &str = "parity";

/// Everything the supervisor needs for one launch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Identity of the supervised service. One supervisor per name.
    pub service_name: String,
    /// Resolved binary location; `None` fails the launch.
    pub binary_path: Option<PathBuf>,
    /// Arguments passed verbatim, no shell interpretation.
    pub args: Vec<String>,
    /// When set, `start()` returns `Skipped` without probing.
    pub skip_launch: bool,
    /// Combined stdout/stderr log, rotated on each launch.
    pub log_path: PathBuf,
    /// Where to record the owned child's pid, if anywhere.
    pub lock_path: Option<PathBuf>,
    /// Log signatures of a benign duplicate-instance exit.
    pub duplicate_patterns: DuplicatePatterns,
}

impl LaunchConfig {
    /// Create a configuration with required fields.
    #[must_use]
    pub fn new(service_name: impl Into<String>, log_path: impl Into<PathBuf>) -> Self {
        Self {
            service_name: service_name.into(),
            binary_path: None,
            args: Vec::new(),
            skip_launch: false,
            log_path: log_path.into(),
            lock_path: None,
            duplicate_patterns: DuplicatePatterns::default(),
        }
    }

    #[must_use]
    pub fn with_binary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_skip_launch(mut self, skip: bool) -> Self {
        self.skip_launch = skip;
        self
    }

    #[must_use]
    pub fn with_lock_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.lock_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_duplicate_patterns(mut self, patterns: DuplicatePatterns) -> Self {
        self.duplicate_patterns = patterns;
        self
    }

    /// Whether the host asked for a specific argument vector.
    ///
    /// A fatal exit under explicit arguments terminates the host.
    pub fn has_explicit_args(&self) -> bool {
        !self.args.is_empty()
    }
}
