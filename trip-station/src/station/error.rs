//! Station runtime error types.

use std::net::SocketAddr;

use crate::protocol::ProtocolError;
use crate::timetable::TimetableError;

/// Errors surfaced by a running station to its callers.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// The station task has exited and can no longer answer
    #[error("station is not running")]
    Stopped,

    /// The search could not be started or was abandoned
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Timetable could not be loaded at startup
    #[error(transparent)]
    Timetable(#[from] TimetableError),

    /// Socket could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("socket has no local address: {0}")]
    LocalAddress(#[source] std::io::Error),

    /// Bound to a wildcard address, which replies never come from
    #[error("station socket {0} is bound to an unspecified address")]
    UnspecifiedAddress(SocketAddr),
}
