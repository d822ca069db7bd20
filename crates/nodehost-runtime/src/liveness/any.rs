use std::sync::Arc;

use nodehost_core::{LivenessError, LivenessProbe, ServiceHandle};

/// Tries probes in order; the first one to find an instance wins.
///
/// A probe error stops the scan and propagates.
#[derive(Clone, Default)]
pub struct AnyDetector {
    probes: Vec<Arc<dyn LivenessProbe>>,
}

impl AnyDetector {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn LivenessProbe>) -> Self {
        self.probes.push(probe);
        self
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}

impl LivenessProbe for AnyDetector {
    fn detect(&self) -> Result<Option<ServiceHandle>, LivenessError> {
        for probe in &self.probes {
            if let Some(handle) = probe.detect()? {
                return Ok(Some(handle));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        result: Option<ServiceHandle>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(result: Option<ServiceHandle>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl LivenessProbe for Fixed {
        fn detect(&self) -> Result<Option<ServiceHandle>, LivenessError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.result)
        }
    }

    struct Broken;

    impl LivenessProbe for Broken {
        fn detect(&self) -> Result<Option<ServiceHandle>, LivenessError> {
            Err(LivenessError::ProcessQuery("denied".into()))
        }
    }

    #[test]
    fn empty_detector_finds_nothing() {
        assert!(AnyDetector::new().detect().unwrap().is_none());
    }

    #[test]
    fn first_match_wins_and_stops_scan() {
        let first = Fixed::new(None);
        let second = Fixed::new(Some(ServiceHandle::new(5, 0)));
        let third = Fixed::new(Some(ServiceHandle::new(6, 0)));
        let detector = AnyDetector::new()
            .with_probe(first.clone())
            .with_probe(second.clone())
            .with_probe(third.clone());

        assert_eq!(detector.detect().unwrap(), Some(ServiceHandle::new(5, 0)));
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(third.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn errors_propagate() {
        let detector = AnyDetector::new().with_probe(Arc::new(Broken));
        assert!(matches!(
            detector.detect(),
            Err(LivenessError::ProcessQuery(_))
        ));
    }
}
