//! Trip legs: single timetabled rides out of a station.

use serde::{Deserialize, Serialize};

use super::{ClockTime, StationName};

/// One timetabled ride from a station to a directly reachable destination.
///
/// Legs are read from the station's timetable and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripLeg {
    /// When the ride leaves this station.
    pub departure: ClockTime,

    /// The route or service taken, e.g. "Bus_12".
    pub route: String,

    /// Where at this station the ride departs from, e.g. "Stop3".
    pub stop: String,

    /// When the ride reaches `destination`.
    pub arrival: ClockTime,

    /// The station the ride ends at.
    pub destination: StationName,
}

impl TripLeg {
    /// Create a new leg.
    pub fn new(
        departure: ClockTime,
        route: impl Into<String>,
        stop: impl Into<String>,
        arrival: ClockTime,
        destination: StationName,
    ) -> Self {
        Self {
            departure,
            route: route.into(),
            stop: stop.into(),
            arrival,
            destination,
        }
    }

    /// Whether this leg ends at `station`.
    pub fn goes_to(&self, station: &StationName) -> bool {
        &self.destination == station
    }
}
