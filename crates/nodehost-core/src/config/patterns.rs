//! Known log signatures of a node refusing to start because another
//! instance already owns its resources.
//!
//! Matching free text is a heuristic: node releases reword their messages.
//! The set is therefore versioned and every pattern has a fixture test.

use serde::{Deserialize, Serialize};

/// Websocket port already bound by another client.
const WS_PORT_IN_USE: &str = "is already in use, make sure that another instance of an Ethereum client is not running or change the address using the --ws-port and --ws-interface options.";

/// Database lock held by another client.
const DB_LOCK_HELD: &str = "IO error: While lock file:";

/// Versioned list of benign substrings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicatePatterns {
    version: u32,
    patterns: Vec<String>,
}

impl DuplicatePatterns {
    /// Version of the built-in pattern set.
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(version: u32, patterns: Vec<String>) -> Self {
        Self { version, patterns }
    }

    /// The built-in set for the current node release.
    pub fn node_defaults() -> Self {
        Self::new(
            Self::CURRENT_VERSION,
            vec![WS_PORT_IN_USE.to_string(), DB_LOCK_HELD.to_string()],
        )
    }

    /// An empty set; every nonzero exit is fatal.
    pub const fn none() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            patterns: Vec::new(),
        }
    }

    /// Add one more substring to the set.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        if !pattern.is_empty() && !self.patterns.contains(&pattern) {
            self.patterns.push(pattern);
        }
        self
    }

    /// Return the first pattern contained in `line`.
    ///
    /// Empty patterns never match.
    pub fn matches(&self, line: &str) -> Option<&str> {
        self.patterns
            .iter()
            .map(String::as_str)
            .find(|p| !p.is_empty() && line.contains(p))
    }

    pub const fn version(&self) -> u32 {
        self.version
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for DuplicatePatterns {
    fn default() -> Self {
        Self::node_defaults()
    }
}
