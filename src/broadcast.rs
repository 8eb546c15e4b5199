use crate::error::{BroadcastError, Result};
use crate::events::TrackedEvent;
use crate::registry::{ConnectionRegistry, SinkError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Counters for the fan-out path.
#[derive(Default)]
pub struct BroadcastStats {
    pub events_broadcast: AtomicU64,
    pub deliveries: AtomicU64,
    pub connections_pruned: AtomicU64,
}

/// Fans one event out to every registered connection.
///
/// The event is serialized once; every recipient gets the identical
/// payload. A closed sink is expected churn and is pruned from the
/// registry without fuss; any other send failure is surfaced, since
/// masking it could hide real bugs. Sends are immediate and synchronous —
/// there is no queueing here, and no timeout-based eviction of slow
/// clients.
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
    stats: BroadcastStats,
}

impl Broadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            registry,
            stats: BroadcastStats::default(),
        }
    }

    /// Send `event` to every connection in a registry snapshot, pruning
    /// connections whose sink reports closed. Returns the number of
    /// successful deliveries.
    pub fn broadcast(&self, event: &TrackedEvent) -> Result<usize> {
        let payload = event.to_wire()?;
        self.stats.events_broadcast.fetch_add(1, Ordering::Relaxed);

        let mut delivered = 0usize;
        let mut dead = Vec::new();
        let mut failure = None;

        for handle in self.registry.snapshot() {
            match handle.send(&payload) {
                Ok(()) => delivered += 1,
                Err(SinkError::Closed) => {
                    debug!(connection = %handle.id(), "Client gone, pruning connection");
                    dead.push(handle.id());
                }
                Err(SinkError::Other(details)) => {
                    failure = Some(BroadcastError::SendFailed {
                        connection: handle.id(),
                        details,
                    });
                    break;
                }
            }
        }

        // Prune whatever churn was discovered before any hard failure.
        self.stats
            .connections_pruned
            .fetch_add(dead.len() as u64, Ordering::Relaxed);
        for id in dead {
            self.registry.remove(&id);
        }

        if let Some(err) = failure {
            return Err(err.into());
        }

        self.stats
            .deliveries
            .fetch_add(delivered as u64, Ordering::Relaxed);
        Ok(delivered)
    }

    pub fn stats(&self) -> &BroadcastStats {
        &self.stats
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ConnectionHandle, ConnectionSink};
    use crate::sensor::JointName;
    use parking_lot::Mutex;

    enum Behavior {
        Accept,
        Closed,
        Fail,
    }

    struct TestSink {
        behavior: Behavior,
        received: Mutex<Vec<String>>,
    }

    impl TestSink {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                received: Mutex::new(Vec::new()),
            })
        }
    }

    impl ConnectionSink for TestSink {
        fn send(&self, payload: &str) -> std::result::Result<(), SinkError> {
            match self.behavior {
                Behavior::Accept => {
                    self.received.lock().push(payload.to_string());
                    Ok(())
                }
                Behavior::Closed => Err(SinkError::Closed),
                Behavior::Fail => Err(SinkError::Other("socket exploded".to_string())),
            }
        }
    }

    fn sample_event() -> TrackedEvent {
        TrackedEvent::JointUpdate {
            user: 1,
            joint: JointName::Head,
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    #[test]
    fn closed_sinks_are_pruned_and_the_rest_delivered() {
        let registry = Arc::new(ConnectionRegistry::new());
        let broadcaster = Broadcaster::new(Arc::clone(&registry));

        let live: Vec<_> = (0..3).map(|_| TestSink::new(Behavior::Accept)).collect();
        for sink in &live {
            registry.add(ConnectionHandle::new(Arc::clone(sink) as Arc<dyn ConnectionSink>));
        }
        for _ in 0..2 {
            registry.add(ConnectionHandle::new(TestSink::new(Behavior::Closed)));
        }
        assert_eq!(registry.len(), 5);

        let delivered = broadcaster.broadcast(&sample_event()).unwrap();

        assert_eq!(delivered, 3);
        assert_eq!(registry.len(), 3);

        // Every live recipient got the identical payload.
        let expected = sample_event().to_wire().unwrap();
        for sink in &live {
            assert_eq!(*sink.received.lock(), vec![expected.clone()]);
        }
    }

    #[test]
    fn unexpected_send_failure_surfaces() {
        let registry = Arc::new(ConnectionRegistry::new());
        let broadcaster = Broadcaster::new(Arc::clone(&registry));
        registry.add(ConnectionHandle::new(TestSink::new(Behavior::Fail)));

        let err = broadcaster.broadcast(&sample_event()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::SkelcastError::Broadcast(BroadcastError::SendFailed { .. })
        ));
    }

    #[test]
    fn broadcast_to_empty_registry_is_a_noop() {
        let registry = Arc::new(ConnectionRegistry::new());
        let broadcaster = Broadcaster::new(registry);
        assert_eq!(broadcaster.broadcast(&sample_event()).unwrap(), 0);
    }

    #[test]
    fn registry_shrinks_across_repeated_broadcasts() {
        let registry = Arc::new(ConnectionRegistry::new());
        let broadcaster = Broadcaster::new(Arc::clone(&registry));
        registry.add(ConnectionHandle::new(TestSink::new(Behavior::Closed)));
        registry.add(ConnectionHandle::new(TestSink::new(Behavior::Accept)));

        broadcaster.broadcast(&sample_event()).unwrap();
        assert_eq!(registry.len(), 1);

        // The pruned connection stays gone.
        broadcaster.broadcast(&sample_event()).unwrap();
        assert_eq!(registry.len(), 1);
    }
}
