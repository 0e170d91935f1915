//! The local station as seen by the protocol.

use std::net::SocketAddr;

use crate::domain::{ClockTime, StationName};
use crate::timetable::Timetable;

use super::token::{MessageId, StationVisit};

/// Everything the protocol knows about the station it runs on.
///
/// Neighbours are fixed for the life of the process; the timetable is
/// replaced whenever the backing file is reloaded.
#[derive(Debug, Clone)]
pub struct Node {
    /// This station's name.
    pub name: StationName,

    /// Address this station receives tokens on.
    pub address: SocketAddr,

    /// Addresses of directly adjacent stations.
    pub neighbours: Vec<SocketAddr>,

    /// Legs departing from this station.
    pub timetable: Timetable,
}

impl Node {
    /// Create a node.
    pub fn new(
        name: StationName,
        address: SocketAddr,
        neighbours: Vec<SocketAddr>,
        timetable: Timetable,
    ) -> Self {
        Self {
            name,
            address,
            neighbours,
            timetable,
        }
    }

    /// Build this station's contribution to a route: its earliest trips
    /// departing at or after `cutoff`.
    pub fn visit(&self, message_id: MessageId, cutoff: ClockTime) -> StationVisit {
        StationVisit {
            station_name: self.name.clone(),
            message_id,
            station_udp_address: self.address,
            earliest_trips: self.timetable.earliest_trips(cutoff),
        }
    }
}
