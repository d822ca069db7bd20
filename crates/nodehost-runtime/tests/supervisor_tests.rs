//! Launch, classification and teardown of a real child process.
//!
//! Children are `/bin/sh` scripts, so these only run on Unix.

#![cfg(unix)]

mod common;

use std::time::Duration;

use common::{FixedProbe, Harness, wait_for_exit, write_script};
use nodehost_core::{
    ExitClassification, HostEvent, LaunchConfig, LaunchError, LaunchOutcome, LivenessProbe,
    ServiceHandle, ServiceStatus,
};
use nodehost_runtime::liveness::{LockFileDetector, pid_exists, read_lock_file};
use nodehost_runtime::supervisor::{LAUNCH_CONTEXT, RUN_CONTEXT};
use nodehost_runtime::{Supervisor, SupervisorError};
use tempfile::tempdir;

const LOCK_LINE: &str =
    "IO error: While lock file: /tmp/chains/ethereum/db/LOCK: Resource temporarily unavailable";

fn shell(service: &str, log: &std::path::Path, script: &str) -> LaunchConfig {
    LaunchConfig::new(service, log)
        .with_binary_path("/bin/sh")
        .with_args(["-c", script])
}

#[tokio::test]
async fn existing_instance_is_reused_without_spawning() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("node.log");
    std::fs::write(&log, "previous run\n").unwrap();

    let existing = ServiceHandle::new(4321, 1_700_000_000);
    let harness = Harness::new(FixedProbe::running(existing));
    let config = LaunchConfig::new("sup-already-running", &log)
        .with_binary_path(dir.path().join("never-spawned"));
    let supervisor = Supervisor::new(config, harness.ports()).unwrap();

    let outcome = supervisor.start().await;

    assert_eq!(outcome, LaunchOutcome::AlreadyRunning { handle: existing });
    assert_eq!(std::fs::read_to_string(&log).unwrap(), "previous run\n");
    assert_eq!(supervisor.owned_handle().await, None);
    assert!(harness.reporter.reports().is_empty());
}

#[tokio::test]
async fn skip_launch_does_not_probe_or_spawn() {
    let dir = tempdir().unwrap();
    let harness = Harness::new(FixedProbe::absent());
    let config = shell("sup-skip", &dir.path().join("node.log"), "exit 0").with_skip_launch(true);
    let supervisor = Supervisor::new(config, harness.ports()).unwrap();

    assert_eq!(supervisor.start().await, LaunchOutcome::Skipped);
    assert_eq!(harness.probe.calls(), 0);
    assert_eq!(supervisor.status().await, ServiceStatus::Stopped);
    assert!(!dir.path().join("node.log").exists());
}

#[tokio::test]
async fn unresolved_binary_fails_fast() {
    let dir = tempdir().unwrap();
    let harness = Harness::new(FixedProbe::absent());
    let config = LaunchConfig::new("sup-unresolved", dir.path().join("node.log"));
    let supervisor = Supervisor::new(config, harness.ports()).unwrap();

    let outcome = supervisor.start().await;

    assert_eq!(
        outcome,
        LaunchOutcome::Failed {
            cause: LaunchError::binary_path_unresolved()
        }
    );
    assert_eq!(supervisor.last_outcome().await, Some(outcome));
    assert_eq!(harness.probe.calls(), 1);
    assert_eq!(
        harness.reporter.reports(),
        vec![(LaunchError::binary_path_unresolved(), LAUNCH_CONTEXT.to_string())]
    );
}

#[tokio::test]
async fn spawn_failure_is_reported_and_host_continues() {
    let dir = tempdir().unwrap();
    let harness = Harness::new(FixedProbe::absent());
    let config = LaunchConfig::new("sup-spawn-failure", dir.path().join("node.log"))
        .with_binary_path(dir.path().join("missing-binary"));
    let supervisor = Supervisor::new(config, harness.ports()).unwrap();

    let outcome = supervisor.start().await;

    assert!(matches!(
        &outcome,
        LaunchOutcome::Failed {
            cause: LaunchError::Spawn { .. }
        }
    ));
    assert_eq!(harness.reporter.reports().len(), 1);
    assert!(harness.host.exits().is_empty());
}

#[tokio::test]
async fn concurrent_starts_own_a_single_child() {
    let dir = tempdir().unwrap();
    let harness = Harness::new(FixedProbe::absent());
    let mut events = harness.events.subscribe();
    let config = shell("sup-concurrent", &dir.path().join("node.log"), "exec sleep 30");
    let supervisor = Supervisor::new(config, harness.ports()).unwrap();

    let (first, second) = tokio::join!(supervisor.start(), supervisor.start());

    let LaunchOutcome::Started { handle } = first else {
        panic!("expected Started, got {first:?}");
    };
    assert_eq!(second, LaunchOutcome::Started { handle });
    assert_eq!(supervisor.owned_handle().await, Some(handle));
    // The second caller found the owned child before probing.
    assert_eq!(harness.probe.calls(), 1);

    supervisor.stop().await;
    assert_eq!(wait_for_exit(&mut events).await, ExitClassification::Clean);
    assert!(harness.host.exits().is_empty());
    assert!(harness.reporter.reports().is_empty());
}

#[tokio::test]
async fn clean_exit_ignores_log_content() {
    let dir = tempdir().unwrap();
    let harness = Harness::new(FixedProbe::absent());
    let mut events = harness.events.subscribe();
    let script = format!("echo '{LOCK_LINE}'; exit 0");
    let supervisor =
        Supervisor::new(shell("sup-clean", &dir.path().join("node.log"), &script), harness.ports())
            .unwrap();

    assert!(matches!(supervisor.start().await, LaunchOutcome::Started { .. }));
    assert_eq!(wait_for_exit(&mut events).await, ExitClassification::Clean);

    assert!(harness.reporter.reports().is_empty());
    assert!(harness.host.exits().is_empty());
    assert_eq!(
        supervisor.status().await,
        ServiceStatus::Exited {
            classification: ExitClassification::Clean
        }
    );
}

#[tokio::test]
async fn duplicate_instance_exit_is_logged_only() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("node.log");
    let binary = write_script(
        dir.path(),
        "node",
        &format!("echo 'Starting node' >&2\necho '{LOCK_LINE}' >&2\nexit 137"),
    );
    let harness = Harness::new(FixedProbe::absent());
    let mut events = harness.events.subscribe();
    let config = LaunchConfig::new("sup-duplicate", &log).with_binary_path(&binary);
    let supervisor = Supervisor::new(config, harness.ports()).unwrap();

    assert!(matches!(supervisor.start().await, LaunchOutcome::Started { .. }));
    assert_eq!(
        wait_for_exit(&mut events).await,
        ExitClassification::DuplicateInstance
    );

    assert!(harness.reporter.reports().is_empty());
    assert!(harness.host.exits().is_empty());
    let captured = std::fs::read_to_string(&log).unwrap();
    assert!(captured.contains("Starting node"));
    assert!(captured.contains(LOCK_LINE));
}

#[tokio::test]
async fn fatal_exit_with_explicit_args_terminates_host() {
    let dir = tempdir().unwrap();
    let harness = Harness::new(FixedProbe::absent());
    let mut events = harness.events.subscribe();
    let config = shell(
        "sup-fatal-explicit",
        &dir.path().join("node.log"),
        "echo 'Unrelated failure'; exit 1",
    );
    let supervisor = Supervisor::new(config, harness.ports()).unwrap();

    supervisor.start().await;
    assert_eq!(
        wait_for_exit(&mut events).await,
        ExitClassification::Fatal {
            exit_code: Some(1),
            signal: None
        }
    );

    assert_eq!(harness.host.exits(), vec![1]);
    assert!(harness.reporter.reports().is_empty());
}

#[tokio::test]
async fn fatal_exit_without_args_is_reported() {
    let dir = tempdir().unwrap();
    let binary = write_script(dir.path(), "node", "echo 'panicked at src/main.rs'\nexit 3");
    let harness = Harness::new(FixedProbe::absent());
    let mut events = harness.events.subscribe();
    let config =
        LaunchConfig::new("sup-fatal-report", dir.path().join("node.log")).with_binary_path(binary);
    let supervisor = Supervisor::new(config, harness.ports()).unwrap();

    supervisor.start().await;
    wait_for_exit(&mut events).await;

    assert!(harness.host.exits().is_empty());
    assert_eq!(
        harness.reporter.reports(),
        vec![(
            LaunchError::FatalExit {
                exit_code: Some(3),
                signal: None
            },
            RUN_CONTEXT.to_string()
        )]
    );
}

#[tokio::test]
async fn stop_terminates_child_and_is_idempotent() {
    let dir = tempdir().unwrap();
    let harness = Harness::new(FixedProbe::absent());
    let mut events = harness.events.subscribe();
    let config = shell("sup-stop", &dir.path().join("node.log"), "exec sleep 30");
    let supervisor = Supervisor::new(config, harness.ports()).unwrap();

    let LaunchOutcome::Started { handle } = supervisor.start().await else {
        panic!("expected Started");
    };
    assert!(supervisor.is_running().await);

    supervisor.stop().await;
    supervisor.stop().await;
    assert_eq!(supervisor.owned_handle().await, None);
    assert_eq!(wait_for_exit(&mut events).await, ExitClassification::Clean);

    assert_eq!(supervisor.status().await, ServiceStatus::Stopped);
    assert!(!pid_exists(handle.pid));
    assert!(harness.reporter.reports().is_empty());
}

#[tokio::test]
async fn stop_without_child_is_a_no_op() {
    let harness = Harness::new(FixedProbe::absent());
    let supervisor =
        Supervisor::new(LaunchConfig::new("sup-stop-idle", "/tmp/unused.log"), harness.ports())
            .unwrap();
    supervisor.stop().await;
    assert_eq!(supervisor.status().await, ServiceStatus::Stopped);
}

/// A node that records SIGTERM in `marker` and exits cleanly.
fn graceful_node(marker: &std::path::Path) -> String {
    format!(
        "trap \"echo term > '{}'; exit 0\" TERM\nwhile true; do sleep 0.1; done",
        marker.display()
    )
}

#[test]
fn stop_signals_the_node_before_the_runtime_goes_away() {
    let dir = tempdir().unwrap();
    let marker = dir.path().join("terminated");
    let harness = Harness::new(FixedProbe::absent());
    let config = shell(
        "sup-stop-graceful",
        &dir.path().join("node.log"),
        &graceful_node(&marker),
    );

    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async {
        let supervisor = Supervisor::new(config, harness.ports()).unwrap();
        assert!(matches!(
            supervisor.start().await,
            LaunchOutcome::Started { .. }
        ));
        tokio::time::sleep(Duration::from_millis(300)).await;
        supervisor.stop().await;
    });
    drop(runtime);

    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while !marker.exists() && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(50));
    }
    assert!(marker.exists(), "node never saw SIGTERM");
}

#[tokio::test]
async fn shutdown_waits_for_a_graceful_exit() {
    let dir = tempdir().unwrap();
    let marker = dir.path().join("terminated");
    let lock = dir.path().join("node.lock");
    let harness = Harness::new(FixedProbe::absent());
    let config = shell(
        "sup-shutdown",
        &dir.path().join("node.log"),
        &graceful_node(&marker),
    )
    .with_lock_path(&lock);
    let supervisor = Supervisor::new(config, harness.ports()).unwrap();

    let LaunchOutcome::Started { handle } = supervisor.start().await else {
        panic!("expected Started");
    };
    tokio::time::sleep(Duration::from_millis(300)).await;
    supervisor.shutdown().await;

    assert!(marker.exists());
    assert!(!lock.exists());
    assert!(!pid_exists(handle.pid));
    assert_eq!(supervisor.status().await, ServiceStatus::Stopped);
    assert!(harness.host.exits().is_empty());
}

#[tokio::test]
async fn availability_events_bracket_the_child() {
    let dir = tempdir().unwrap();
    let harness = Harness::new(FixedProbe::absent());
    let mut events = harness.events.subscribe();
    let supervisor = Supervisor::new(
        shell("sup-events", &dir.path().join("node.log"), "exit 0"),
        harness.ports(),
    )
    .unwrap();

    supervisor.start().await;

    let mut seen = Vec::new();
    tokio::time::timeout(Duration::from_secs(15), async {
        loop {
            let event = events.recv().await.unwrap();
            let done = matches!(event, HostEvent::ServiceExited { .. });
            seen.push(event);
            if done {
                break;
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(
        seen,
        vec![
            HostEvent::service_available(true),
            HostEvent::service_available(false),
            HostEvent::ServiceExited {
                classification: ExitClassification::Clean
            },
        ]
    );
}

#[tokio::test]
async fn lock_file_tracks_the_owned_child() {
    let dir = tempdir().unwrap();
    let lock = dir.path().join("node.lock");
    let harness = Harness::new(FixedProbe::absent());
    let mut events = harness.events.subscribe();
    let config = shell("sup-lock", &dir.path().join("node.log"), "exec sleep 30")
        .with_lock_path(&lock);
    let supervisor = Supervisor::new(config, harness.ports()).unwrap();

    let LaunchOutcome::Started { handle } = supervisor.start().await else {
        panic!("expected Started");
    };
    assert_eq!(read_lock_file(&lock).unwrap(), handle.pid);

    // A second application instance would see the owned child.
    let seen = LockFileDetector::new(&lock).detect().unwrap().unwrap();
    assert_eq!(seen.pid, handle.pid);

    supervisor.stop().await;
    wait_for_exit(&mut events).await;
    assert!(!lock.exists());
}

#[tokio::test]
async fn restart_rotates_the_log() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("node.log");
    std::fs::write(&log, "output of an earlier launch\n").unwrap();
    let harness = Harness::new(FixedProbe::absent());
    let mut events = harness.events.subscribe();
    let supervisor =
        Supervisor::new(shell("sup-rotate", &log, "echo fresh"), harness.ports()).unwrap();

    supervisor.start().await;
    wait_for_exit(&mut events).await;

    assert_eq!(std::fs::read_to_string(&log).unwrap(), "fresh\n");
}

#[tokio::test]
async fn second_supervisor_for_same_service_is_refused() {
    let harness = Harness::new(FixedProbe::absent());
    let config = LaunchConfig::new("sup-singleton", "/tmp/unused.log");

    let first = Supervisor::new(config.clone(), harness.ports()).unwrap();
    assert!(matches!(
        Supervisor::new(config.clone(), harness.ports()),
        Err(SupervisorError::AlreadySupervised(_))
    ));

    drop(first);
    assert!(Supervisor::new(config, harness.ports()).is_ok());
}
