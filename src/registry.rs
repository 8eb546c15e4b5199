use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Identifier for one live client connection.
pub type ConnectionId = Uuid;

/// Why a send into a connection sink failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The peer is gone; the broken-pipe case. Expected churn.
    Closed,
    /// Anything else. Surfaced to the caller, never silently absorbed.
    Other(String),
}

/// Outbound half of one client connection.
///
/// The transport layer owns the underlying socket; the registry only holds
/// this send handle and drops it once the connection is deregistered.
pub trait ConnectionSink: Send + Sync {
    fn send(&self, payload: &str) -> Result<(), SinkError>;
}

/// A registered client connection: an id plus its outbound sink.
#[derive(Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sink: Arc<dyn ConnectionSink>,
}

impl ConnectionHandle {
    pub fn new(sink: Arc<dyn ConnectionSink>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sink,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn send(&self, payload: &str) -> Result<(), SinkError> {
        self.sink.send(payload)
    }
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("id", &self.id)
            .finish()
    }
}

/// The set of currently live client connections.
///
/// Membership is the sole lifetime signal: present means assumed alive,
/// absent means the connection receives no further events. `snapshot`
/// returns a point-in-time copy so the broadcaster can remove handles
/// while iterating. `add` and `remove` are idempotent.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<ConnectionId, ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, handle: ConnectionHandle) {
        let mut connections = self.connections.lock();
        if connections.insert(handle.id(), handle).is_none() {
            debug!(total = connections.len(), "Connection registered");
        }
    }

    pub fn remove(&self, id: &ConnectionId) {
        let mut connections = self.connections.lock();
        if connections.remove(id).is_some() {
            debug!(total = connections.len(), "Connection deregistered");
        }
    }

    pub fn snapshot(&self) -> Vec<ConnectionHandle> {
        self.connections.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.connections.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex as PlMutex;

    struct RecordingSink {
        sent: PlMutex<Vec<String>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sent: PlMutex::new(Vec::new()),
            })
        }
    }

    impl ConnectionSink for RecordingSink {
        fn send(&self, payload: &str) -> Result<(), SinkError> {
            self.sent.lock().push(payload.to_string());
            Ok(())
        }
    }

    #[test]
    fn add_and_remove_are_idempotent() {
        let registry = ConnectionRegistry::new();
        let handle = ConnectionHandle::new(RecordingSink::new());
        let id = handle.id();

        registry.add(handle.clone());
        registry.add(handle);
        assert_eq!(registry.len(), 1);

        registry.remove(&id);
        registry.remove(&id);
        assert!(registry.is_empty());
    }

    #[test]
    fn snapshot_is_a_point_in_time_copy() {
        let registry = ConnectionRegistry::new();
        let a = ConnectionHandle::new(RecordingSink::new());
        let b = ConnectionHandle::new(RecordingSink::new());
        registry.add(a.clone());
        registry.add(b);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);

        // Mutating the registry while holding the snapshot is safe.
        for handle in &snapshot {
            registry.remove(&handle.id());
        }
        assert!(registry.is_empty());
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn distinct_handles_never_collide() {
        let registry = ConnectionRegistry::new();
        for _ in 0..16 {
            registry.add(ConnectionHandle::new(RecordingSink::new()));
        }
        assert_eq!(registry.len(), 16);
    }
}
