use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// `idle -> in-flight -> idle` guard for one asynchronous operation.
///
/// A second trigger while the first is still running is refused instead of
/// queued. The gate returns to idle when the [`InFlight`] ticket is dropped,
/// so a caller that goes away mid-request releases it too.
#[derive(Debug, Clone, Default)]
pub struct OperationGate {
    in_flight: Arc<AtomicBool>,
}

#[derive(Debug)]
#[must_use = "the gate reopens as soon as the ticket is dropped"]
pub struct InFlight {
    in_flight: Arc<AtomicBool>,
}

impl OperationGate {
    pub fn try_begin(&self) -> Option<InFlight> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_trigger_is_refused_while_in_flight() {
        let gate = OperationGate::default();

        let ticket = gate.try_begin().expect("idle gate opens");
        assert!(gate.is_in_flight());
        assert!(gate.try_begin().is_none());
        assert!(gate.clone().try_begin().is_none());

        drop(ticket);
        assert!(!gate.is_in_flight());
        assert!(gate.try_begin().is_some());
    }

    #[tokio::test]
    async fn test_cancelled_task_releases_gate() {
        let gate = OperationGate::default();
        let task_gate = gate.clone();

        let handle = tokio::spawn(async move {
            let _ticket = task_gate.try_begin();
            std::future::pending::<()>().await;
        });

        tokio::task::yield_now().await;
        while !gate.is_in_flight() {
            tokio::task::yield_now().await;
        }

        handle.abort();
        let _ = handle.await;
        assert!(!gate.is_in_flight());
    }
}
