//! Protocol error types.

use super::ledger::LedgerInvariantViolation;
use super::token::MessageId;

/// Errors raised while the engine processes a query or a token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// A reply arrived on an edge this station never recorded. The search
    /// it belongs to cannot complete correctly and is abandoned.
    #[error("search {search}: {violation}")]
    Ledger {
        search: MessageId,
        #[source]
        violation: LedgerInvariantViolation,
    },

    /// The token's route or hop count is inconsistent with this station
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The client query cannot start a search
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl ProtocolError {
    pub(super) fn malformed(message: impl Into<String>) -> Self {
        ProtocolError::MalformedToken(message.into())
    }

    /// The search this error aborts, if it aborts one.
    pub fn search(&self) -> Option<MessageId> {
        match self {
            ProtocolError::Ledger { search, .. } => Some(*search),
            _ => None,
        }
    }
}
