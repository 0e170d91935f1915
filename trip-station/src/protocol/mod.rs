//! The station-to-station search protocol.
//!
//! Stations cooperatively find the fastest trip between two of them without
//! any station knowing the whole network. Searches travel as
//! [`RouteToken`]s: flooded outward from the origin, extended by every
//! station they pass through, and collated on the way back so that each
//! station answers its parent exactly once per fan-out.

mod bank;
mod collate;
mod engine;
mod error;
mod ledger;
mod node;
mod outcome;
mod query;
mod token;
mod transport;

#[cfg(test)]
mod engine_tests;

pub use bank::ReplyBuffer;
pub use collate::collate;
pub use engine::{Completion, Engine, SearchStart};
pub use error::ProtocolError;
pub use ledger::{Ledger, LedgerInvariantViolation, PendingEdge};
pub use node::Node;
pub use outcome::{HopLeg, TripOutcome};
pub use query::{QueryError, TripQuery};
pub use token::{MessageId, MessageType, RouteToken, StationVisit};
pub use transport::{Transport, TransportError};
