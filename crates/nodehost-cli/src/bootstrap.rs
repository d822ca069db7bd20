//! CLI bootstrap - the composition root.
//!
//! The only place where the runtime's concrete adapters are chosen for the
//! CLI: lock file and process-table liveness probes, the tracing error
//! reporter, the global host event broadcaster and real process exit.
//! Handlers receive a [`CliContext`] and build what they need from it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use nodehost_core::{DuplicatePatterns, HostEventEmitter, LaunchConfig, ResolvedPaths, data_root};
use nodehost_runtime::{
    AnyDetector, HostEventBroadcaster, LockFileDetector, ProcessExit, ProcessScanDetector,
    Supervisor, SupervisorPorts, TracingReporter, get_host_event_broadcaster,
};
use tracing::debug;

use crate::commands::{NodeArgs, RunArgs};
use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub service_name: String,
    pub data_root: PathBuf,
}

impl CliConfig {
    /// Config rooted at the platform data directory (or `NODEHOST_DATA_DIR`).
    pub fn with_defaults(service_name: impl Into<String>) -> Result<Self, CliError> {
        Ok(Self {
            service_name: service_name.into(),
            data_root: data_root()?,
        })
    }
}

/// Resolved service identity and shared infrastructure for one CLI run.
pub struct CliContext {
    pub service_name: String,
    pub paths: ResolvedPaths,
    pub events: Arc<HostEventBroadcaster>,
}

/// Build the CLI context.
pub fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let paths = ResolvedPaths::for_service(&config.data_root, &config.service_name)?;
    Ok(CliContext {
        service_name: config.service_name,
        paths,
        events: get_host_event_broadcaster(),
    })
}

/// Node binary from the flag or environment, else from `PATH` by service name.
pub fn resolve_binary(explicit: Option<&Path>, service_name: &str) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    match which::which(service_name) {
        Ok(path) => Some(path),
        Err(e) => {
            debug!(service = service_name, error = %e, "Node binary not found on PATH");
            None
        }
    }
}

impl CliContext {
    pub fn ipc_path(&self, explicit: Option<&Path>) -> PathBuf {
        explicit.map_or_else(|| self.paths.ipc_path.clone(), Path::to_path_buf)
    }

    pub fn lock_path(&self, node: &NodeArgs) -> PathBuf {
        node.lock_path
            .clone()
            .unwrap_or_else(|| self.paths.lock_path.clone())
    }

    /// Lock file first, then the process table.
    pub fn detector(&self, node: &NodeArgs, binary: Option<&Path>) -> AnyDetector {
        let scan = binary
            .and_then(ProcessScanDetector::for_binary)
            .unwrap_or_else(|| ProcessScanDetector::new(self.service_name.as_str()));

        AnyDetector::new()
            .with_probe(Arc::new(LockFileDetector::new(self.lock_path(node))))
            .with_probe(Arc::new(scan))
    }

    pub fn launch_config(&self, args: &RunArgs, binary: Option<PathBuf>) -> LaunchConfig {
        let patterns = args
            .duplicate_patterns
            .iter()
            .fold(DuplicatePatterns::node_defaults(), |patterns, extra| {
                patterns.with_pattern(extra.as_str())
            });
        let log_path = args
            .log_path
            .clone()
            .unwrap_or_else(|| self.paths.log_path.clone());

        let config = LaunchConfig::new(self.service_name.as_str(), log_path)
            .with_args(&args.node_args)
            .with_skip_launch(args.no_run_node)
            .with_lock_path(self.lock_path(&args.node))
            .with_duplicate_patterns(patterns);

        match binary {
            Some(path) => config.with_binary_path(path),
            None => config,
        }
    }

    /// Wire a supervisor to the CLI's adapters.
    pub fn supervisor(
        &self,
        config: LaunchConfig,
        detector: AnyDetector,
    ) -> Result<Supervisor, CliError> {
        let events: Arc<dyn HostEventEmitter> = self.events.clone();
        let reporter = TracingReporter::new().with_events(Arc::clone(&events));
        let ports = SupervisorPorts::new(Arc::new(detector), Arc::new(ProcessExit))
            .with_reporter(Arc::new(reporter))
            .with_events(events);
        Ok(Supervisor::new(config, ports)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodehost_core::LaunchOutcome;
    use tempfile::tempdir;

    fn run_args() -> RunArgs {
        RunArgs {
            node: NodeArgs::default(),
            no_run_node: false,
            log_path: None,
            ipc_path: None,
            duplicate_patterns: Vec::new(),
            no_channel: false,
            retry_ms: 1000,
            node_args: Vec::new(),
        }
    }

    fn context(root: &Path, service: &str) -> CliContext {
        bootstrap(CliConfig {
            service_name: service.to_string(),
            data_root: root.to_path_buf(),
        })
        .unwrap()
    }

    #[test]
    fn bootstrap_resolves_service_paths() {
        let dir = tempdir().unwrap();
        let ctx = context(dir.path(), "parity");
        assert_eq!(ctx.paths.log_path, dir.path().join("parity.log"));
        assert_eq!(ctx.lock_path(&NodeArgs::default()), dir.path().join("parity.lock"));
    }

    #[test]
    fn bootstrap_rejects_path_like_service_names() {
        let dir = tempdir().unwrap();
        let result = bootstrap(CliConfig {
            service_name: "../parity".to_string(),
            data_root: dir.path().to_path_buf(),
        });
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn explicit_paths_override_defaults() {
        let dir = tempdir().unwrap();
        let ctx = context(dir.path(), "parity");
        let node = NodeArgs {
            node_path: None,
            lock_path: Some(PathBuf::from("/run/parity.pid")),
        };
        assert_eq!(ctx.lock_path(&node), PathBuf::from("/run/parity.pid"));
        assert_eq!(
            ctx.ipc_path(Some(Path::new("/tmp/jsonrpc.ipc"))),
            PathBuf::from("/tmp/jsonrpc.ipc")
        );
    }

    #[test]
    fn launch_config_carries_run_arguments() {
        let dir = tempdir().unwrap();
        let ctx = context(dir.path(), "parity");
        let mut args = run_args();
        args.no_run_node = true;
        args.node_args = vec!["--chain".to_string(), "kovan".to_string()];
        args.duplicate_patterns = vec!["address already in use".to_string()];

        let config = ctx.launch_config(&args, Some(PathBuf::from("/opt/parity")));

        assert!(config.skip_launch);
        assert!(config.has_explicit_args());
        assert_eq!(config.binary_path, Some(PathBuf::from("/opt/parity")));
        assert_eq!(config.log_path, dir.path().join("parity.log"));
        assert_eq!(config.lock_path, Some(dir.path().join("parity.lock")));
        assert!(
            config
                .duplicate_patterns
                .matches("bind: address already in use")
                .is_some()
        );
        assert!(
            config
                .duplicate_patterns
                .matches("IO error: While lock file: /db/LOCK")
                .is_some()
        );
    }

    #[test]
    fn launch_config_without_binary_stays_unresolved() {
        let dir = tempdir().unwrap();
        let ctx = context(dir.path(), "parity");
        assert_eq!(ctx.launch_config(&run_args(), None).binary_path, None);
    }

    #[test]
    fn detector_checks_lock_file_and_process_table() {
        let dir = tempdir().unwrap();
        let ctx = context(dir.path(), "parity");
        assert_eq!(ctx.detector(&NodeArgs::default(), None).len(), 2);
    }

    #[test]
    fn explicit_binary_wins_over_path_lookup() {
        let path = resolve_binary(Some(Path::new("/opt/parity/bin/parity")), "sh");
        assert_eq!(path, Some(PathBuf::from("/opt/parity/bin/parity")));
    }

    #[test]
    fn unknown_binary_is_unresolved() {
        assert_eq!(resolve_binary(None, "nodehost-no-such-node-binary"), None);
    }

    #[tokio::test]
    async fn supervisor_is_wired_to_context() {
        let dir = tempdir().unwrap();
        let ctx = context(dir.path(), "cli-bootstrap-wiring");
        let config = ctx.launch_config(&run_args(), None).with_skip_launch(true);
        let supervisor = ctx
            .supervisor(config, ctx.detector(&NodeArgs::default(), None))
            .unwrap();
        assert_eq!(supervisor.config().service_name, "cli-bootstrap-wiring");
        assert_eq!(supervisor.start().await, LaunchOutcome::Skipped);
    }
}
