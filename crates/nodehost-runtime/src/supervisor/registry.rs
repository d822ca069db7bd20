//! One supervisor per service identity per process.

use std::collections::HashSet;
use std::sync::{LazyLock, Mutex, PoisonError};

use super::error::SupervisorError;

static SUPERVISED: LazyLock<Mutex<HashSet<String>>> = LazyLock::new(|| Mutex::new(HashSet::new()));

/// Claim on a service name, released on drop.
#[derive(Debug)]
pub(super) struct Registration {
    service: String,
}

impl Registration {
    pub(super) fn acquire(service: &str) -> Result<Self, SupervisorError> {
        if service.is_empty() {
            return Err(SupervisorError::EmptyServiceName);
        }
        let mut supervised = SUPERVISED.lock().unwrap_or_else(PoisonError::into_inner);
        if !supervised.insert(service.to_string()) {
            return Err(SupervisorError::AlreadySupervised(service.to_string()));
        }
        Ok(Self {
            service: service.to_string(),
        })
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        SUPERVISED
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.service);
    }
}
