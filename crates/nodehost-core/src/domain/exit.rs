//! Classification of a terminated child.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::DuplicatePatterns;

/// How a terminated node child should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExitClassification {
    /// Exit code 0, or a stop the host asked for.
    Clean,
    /// Nonzero exit explained by another instance holding the port or lock.
    DuplicateInstance,
    /// Anything else.
    Fatal {
        exit_code: Option<i32>,
        signal: Option<i32>,
    },
}

impl ExitClassification {
    /// Classify an exit from its code, signal and the last captured log line.
    ///
    /// Exit code 0 is clean regardless of log content. Otherwise the last
    /// line is matched against the benign patterns before giving up.
    pub fn classify(
        exit_code: Option<i32>,
        signal: Option<i32>,
        last_line: &str,
        patterns: &DuplicatePatterns,
    ) -> Self {
        if exit_code == Some(0) {
            return Self::Clean;
        }
        if patterns.matches(last_line).is_some() {
            return Self::DuplicateInstance;
        }
        Self::Fatal { exit_code, signal }
    }

    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }
}

impl fmt::Display for ExitClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => write!(f, "clean exit"),
            Self::DuplicateInstance => write!(f, "duplicate instance"),
            Self::Fatal { exit_code, signal } => match (exit_code, signal) {
                (Some(code), _) => write!(f, "fatal exit (code {code})"),
                (None, Some(sig)) => write!(f, "fatal exit (signal {sig})"),
                (None, None) => write!(f, "fatal exit"),
            },
        }
    }
}
