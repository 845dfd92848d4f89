use tokio::sync::broadcast;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Created,
    Updated,
    Deleted,
}

/// Emitted by a successful create/update/delete so that lists of the same
/// resource reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationEvent {
    /// Resource tag, the list endpoint of the mutated resource (e.g. `/employees`)
    pub resource: String,
    pub kind: MutationKind,
    pub ids: Vec<Uuid>,
}

impl MutationEvent {
    pub fn new(resource: impl Into<String>, kind: MutationKind, ids: Vec<Uuid>) -> Self {
        Self {
            resource: resource.into(),
            kind,
            ids,
        }
    }
}

/// Broadcast channel carrying [`MutationEvent`]s from mutating actions to list controllers.
#[derive(Clone)]
pub struct MutationBus {
    sender: broadcast::Sender<MutationEvent>,
}

impl MutationBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event; returns how many subscribers received it.
    pub fn publish(&self, event: MutationEvent) -> usize {
        tracing::debug!(resource = %event.resource, kind = ?event.kind, "Publishing mutation");
        self.sender.send(event).unwrap_or(0)
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<MutationEvent> {
        self.sender.subscribe()
    }
}

impl Default for MutationBus {
    fn default() -> Self {
        Self::new(64)
    }
}
