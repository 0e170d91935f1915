//! Route tokens: the search state that travels between stations.
//!
//! A token carries the query (source, destination, trip type, cutoff time)
//! and the route built so far, one [`StationVisit`] per station that
//! extended it. `hop_count` indexes the visit belonging to the station that
//! must act on the token next: the frontier while the token travels
//! outwards, and the station being replied to on the way back.

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ClockTime, StationName, TripLeg, TripType};

use super::error::ProtocolError;
use super::node::Node;

/// Identifier of a search, and of each station's fan-out within it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Mint a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Direction of travel of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Flooding away from the origin.
    Outgoing,
    /// Replying back towards the origin.
    Incoming,
}

/// One station's contribution to a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationVisit {
    pub station_name: StationName,

    /// Identifies this station's fan-out for the search; pending edges and
    /// buffered replies at this station are keyed by it.
    pub message_id: MessageId,

    pub station_udp_address: SocketAddr,

    /// Candidate onward legs. Starts as the station's full earliest-trip set
    /// and is narrowed once the route is resolved.
    pub earliest_trips: Vec<TripLeg>,
}

/// The search state carried in each datagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteToken {
    pub source_name: StationName,
    pub destination_name: StationName,
    pub route: Vec<StationVisit>,
    pub trip_type: TripType,
    pub hop_count: usize,

    /// Departure cutoff at the origin.
    pub time: ClockTime,

    /// Identifies the search as a whole; never changes after origination.
    pub message_id: MessageId,

    pub message_type: MessageType,

    /// Set when this branch ended without reaching the destination.
    pub route_end_found: bool,
}

impl RouteToken {
    /// Start a new search at `origin`, seeded with the origin's earliest trips.
    ///
    /// The origin's visit shares the search's message id.
    pub fn originate(
        origin: &Node,
        destination: StationName,
        trip_type: TripType,
        time: ClockTime,
    ) -> Self {
        let message_id = MessageId::new();
        let mut token = Self {
            source_name: origin.name.clone(),
            destination_name: destination,
            route: Vec::new(),
            trip_type,
            hop_count: 0,
            time,
            message_id,
            message_type: MessageType::Outgoing,
            route_end_found: false,
        };
        token.add_route(origin, time, message_id);
        token
    }

    /// Append `station`'s earliest trips departing at or after `time`.
    pub fn add_route(&mut self, station: &Node, time: ClockTime, message_id: MessageId) {
        self.route.push(station.visit(message_id, time));
    }

    /// The visit at `hop`.
    pub fn visit(&self, hop: usize) -> Result<&StationVisit, ProtocolError> {
        self.route.get(hop).ok_or_else(|| {
            ProtocolError::malformed(format!(
                "hop {hop} out of range for route of {} stations",
                self.route.len()
            ))
        })
    }

    /// The visit at the current hop.
    pub fn current_visit(&self) -> Result<&StationVisit, ProtocolError> {
        self.visit(self.hop_count)
    }

    fn current_visit_mut(&mut self) -> Result<&mut StationVisit, ProtocolError> {
        let len = self.route.len();
        let hop = self.hop_count;
        self.route.get_mut(hop).ok_or_else(|| {
            ProtocolError::malformed(format!("hop {hop} out of range for route of {len} stations"))
        })
    }

    /// Narrow every visit's candidates to the chain that actually connects
    /// source to destination.
    ///
    /// Each visit keeps only legs to the next visit's station; the last
    /// visit keeps only legs to the final destination. Applying this twice
    /// has the same effect as applying it once.
    pub fn match_route(&mut self) {
        let next_stations: Vec<StationName> = self
            .route
            .iter()
            .skip(1)
            .map(|v| v.station_name.clone())
            .chain(std::iter::once(self.destination_name.clone()))
            .collect();

        for (visit, next) in self.route.iter_mut().zip(&next_stations) {
            visit.earliest_trips.retain(|leg| leg.goes_to(next));
        }
    }

    /// The leg at `hop` that reaches the destination directly, if any.
    pub fn find_destination(&self, hop: usize) -> Option<&TripLeg> {
        self.route
            .get(hop)?
            .earliest_trips
            .iter()
            .find(|leg| leg.goes_to(&self.destination_name))
    }

    /// Number of current candidates whose destination has not yet been
    /// visited by this search. Zero means a local dead end.
    pub fn unvisited_destinations(&self) -> Result<usize, ProtocolError> {
        let visited: HashSet<&StationName> = self.route.iter().map(|v| &v.station_name).collect();
        let candidates = &self.current_visit()?.earliest_trips;
        let already_visited = candidates
            .iter()
            .filter(|leg| visited.contains(&leg.destination))
            .count();
        Ok(candidates.len() - already_visited)
    }

    /// Whether the search cannot usefully continue from `station`.
    ///
    /// True when every reachable destination has already been visited, or
    /// when every one of the station's neighbours already appears in the
    /// route. A station with no neighbours is always a dead end.
    pub fn route_end(&self, station: &Node) -> Result<bool, ProtocolError> {
        if self.unvisited_destinations()? == 0 {
            return Ok(true);
        }
        Ok(station
            .neighbours
            .iter()
            .all(|n| self.visited_address(*n)))
    }

    /// Whether the current hop's candidates include a leg to `station`,
    /// i.e. whether the flood was meant to continue through it.
    pub fn reaches_station(&self, station: &StationName) -> Result<bool, ProtocolError> {
        Ok(self
            .current_visit()?
            .earliest_trips
            .iter()
            .any(|leg| leg.goes_to(station)))
    }

    /// Keep only the current hop's legs to the final destination.
    pub fn retain_destination_trips(&mut self) -> Result<(), ProtocolError> {
        let destination = self.destination_name.clone();
        self.current_visit_mut()?
            .earliest_trips
            .retain(|leg| leg.goes_to(&destination));
        Ok(())
    }

    /// Extend the route with `station`, boarding its earliest trips after
    /// the arrival of the current hop's leg to it, and advance the hop.
    pub fn add_station_to_route(
        &mut self,
        station: &Node,
        message_id: MessageId,
    ) -> Result<(), ProtocolError> {
        let arrival = self
            .current_visit()?
            .earliest_trips
            .iter()
            .find(|leg| leg.goes_to(&station.name))
            .map(|leg| leg.arrival)
            .ok_or_else(|| {
                ProtocolError::malformed(format!(
                    "no leg to {} at hop {}",
                    station.name, self.hop_count
                ))
            })?;

        self.add_route(station, arrival, message_id);
        self.hop_count += 1;
        Ok(())
    }

    /// Whether any visit in the route was made by the station at `address`.
    pub fn visited_address(&self, address: SocketAddr) -> bool {
        self.route.iter().any(|v| v.station_udp_address == address)
    }

    /// Encode as a JSON datagram payload.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode from a JSON datagram payload.
    pub fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
