//! Recording port doubles shared by the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nodehost_core::{
    ErrorReporter, ExitClassification, HostControl, HostEvent, LaunchError, LivenessError,
    LivenessProbe, ServiceHandle,
};
use nodehost_runtime::{HostEventBroadcaster, SupervisorPorts};
use tokio::sync::broadcast;

#[derive(Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<(LaunchError, String)>>,
}

impl RecordingReporter {
    pub fn reports(&self) -> Vec<(LaunchError, String)> {
        self.reports.lock().unwrap().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, error: &LaunchError, context: &str) {
        self.reports
            .lock()
            .unwrap()
            .push((error.clone(), context.to_string()));
    }
}

/// Records exit requests instead of exiting.
#[derive(Default)]
pub struct RecordingHost {
    exits: Mutex<Vec<i32>>,
}

impl RecordingHost {
    pub fn exits(&self) -> Vec<i32> {
        self.exits.lock().unwrap().clone()
    }
}

impl HostControl for RecordingHost {
    fn exit(&self, code: i32) {
        self.exits.lock().unwrap().push(code);
    }
}

/// Probe with a fixed answer that counts how often it was asked.
pub struct FixedProbe {
    handle: Option<ServiceHandle>,
    calls: AtomicUsize,
}

impl FixedProbe {
    pub fn absent() -> Arc<Self> {
        Self::with(None)
    }

    pub fn running(handle: ServiceHandle) -> Arc<Self> {
        Self::with(Some(handle))
    }

    fn with(handle: Option<ServiceHandle>) -> Arc<Self> {
        Arc::new(Self {
            handle,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LivenessProbe for FixedProbe {
    fn detect(&self) -> Result<Option<ServiceHandle>, LivenessError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.handle)
    }
}

/// Everything a supervisor test needs to observe.
pub struct Harness {
    pub probe: Arc<FixedProbe>,
    pub reporter: Arc<RecordingReporter>,
    pub host: Arc<RecordingHost>,
    pub events: Arc<HostEventBroadcaster>,
}

impl Harness {
    pub fn new(probe: Arc<FixedProbe>) -> Self {
        Self {
            probe,
            reporter: Arc::new(RecordingReporter::default()),
            host: Arc::new(RecordingHost::default()),
            events: Arc::new(HostEventBroadcaster::new()),
        }
    }

    pub fn ports(&self) -> SupervisorPorts {
        SupervisorPorts::new(self.probe.clone(), self.host.clone())
            .with_reporter(self.reporter.clone())
            .with_events(self.events.clone())
    }
}

/// Write a shell script without executable bits; the supervisor adds them.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    path
}

/// Wait for the next `ServiceExited` event.
pub async fn wait_for_exit(rx: &mut broadcast::Receiver<HostEvent>) -> ExitClassification {
    tokio::time::timeout(Duration::from_secs(15), async {
        loop {
            if let HostEvent::ServiceExited { classification } = rx.recv().await.unwrap() {
                return classification;
            }
        }
    })
    .await
    .expect("node did not exit in time")
}
