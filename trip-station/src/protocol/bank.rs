//! Reply buffer: incoming tokens held until their fan-out has fully replied.

use super::token::{MessageId, RouteToken};

/// Buffered replies awaiting collation.
#[derive(Debug, Default)]
pub struct ReplyBuffer {
    replies: Vec<RouteToken>,
}

impl ReplyBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, token: RouteToken) {
        self.replies.push(token);
    }

    /// Remove and return every reply whose visit at `hop` carries
    /// `message_id`, in arrival order.
    ///
    /// These are exactly the sibling replies to one station's fan-out;
    /// replies for other searches or other hops stay buffered.
    pub fn remove(&mut self, hop: usize, message_id: MessageId) -> Vec<RouteToken> {
        let (matching, rest) = std::mem::take(&mut self.replies)
            .into_iter()
            .partition(|t| t.route.get(hop).is_some_and(|v| v.message_id == message_id));
        self.replies = rest;
        matching
    }

    pub fn len(&self) -> usize {
        self.replies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }
}
