//! Pending-edge ledger: which outbound edges still owe this station a reply.

use std::collections::HashMap;
use std::net::SocketAddr;

use super::token::MessageId;

/// One outbound edge awaiting a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdge {
    /// Fan-out identifier the token was sent under.
    pub message_id: MessageId,

    /// Station this one will reply to once the edge resolves. `None` at the
    /// search's origin.
    pub parent: Option<SocketAddr>,

    /// This station's own address.
    pub station: SocketAddr,

    /// Neighbour the token was sent to.
    pub destination: SocketAddr,
}

/// A reply arrived for an edge that was never recorded (or was already
/// consumed).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no pending edge for message {message_id} from parent {parent:?} to {neighbour}")]
pub struct LedgerInvariantViolation {
    pub message_id: MessageId,
    pub parent: Option<SocketAddr>,
    pub neighbour: SocketAddr,
}

/// Outstanding edges, grouped by fan-out identifier.
#[derive(Debug, Default)]
pub struct Ledger {
    edges: HashMap<MessageId, Vec<PendingEdge>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edge. Several edges may share a message id, one per
    /// neighbour fanned out to.
    pub fn add(&mut self, edge: PendingEdge) {
        self.edges.entry(edge.message_id).or_default().push(edge);
    }

    /// Remove and return the edge matching all three keys.
    pub fn remove(
        &mut self,
        parent: Option<SocketAddr>,
        neighbour: SocketAddr,
        message_id: MessageId,
    ) -> Result<PendingEdge, LedgerInvariantViolation> {
        let violation = || LedgerInvariantViolation {
            message_id,
            parent,
            neighbour,
        };

        let edges = self.edges.get_mut(&message_id).ok_or_else(violation)?;
        let idx = edges
            .iter()
            .position(|e| e.parent == parent && e.destination == neighbour)
            .ok_or_else(violation)?;
        let edge = edges.remove(idx);

        if edges.is_empty() {
            self.edges.remove(&message_id);
        }
        Ok(edge)
    }

    /// Edges still outstanding for `message_id`, or `None` if every edge has
    /// replied.
    pub fn outstanding(&self, message_id: MessageId) -> Option<&[PendingEdge]> {
        self.edges
            .get(&message_id)
            .map(Vec::as_slice)
            .filter(|edges| !edges.is_empty())
    }

    pub fn has_outstanding(&self, message_id: MessageId) -> bool {
        self.outstanding(message_id).is_some()
    }

    /// Whether an edge to `neighbour` is already open for `message_id`.
    pub fn was_sent(&self, message_id: MessageId, neighbour: SocketAddr) -> bool {
        self.outstanding(message_id)
            .is_some_and(|edges| edges.iter().any(|e| e.destination == neighbour))
    }

    /// Total number of outstanding edges across all messages.
    pub fn len(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
