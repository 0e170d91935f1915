//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::TripType;
use crate::protocol::{HopLeg, TripOutcome};
use crate::station::StationInfo;

/// Query string of the station page.
#[derive(Debug, Default, Deserialize)]
pub struct TripQueryParams {
    /// Destination station; without it only the station page is shown
    pub to: Option<String>,

    /// Earliest departure in HH:MM format (defaults to now)
    pub time: Option<String>,

    /// Trip selection policy (defaults to FastestTrip)
    #[serde(rename = "tripType")]
    pub trip_type: Option<String>,
}

impl TripQueryParams {
    /// The requested destination, if one was given.
    pub fn destination(&self) -> Option<&str> {
        self.to.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// A leg of a found trip.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegResult {
    /// Station the leg departs from
    pub station: String,
    pub departure: String,
    pub route: String,
    pub stop: String,
    pub arrival: String,
    pub destination: String,
}

impl LegResult {
    pub fn from_hop(hop: &HopLeg) -> Self {
        Self {
            station: hop.station.to_string(),
            departure: hop.leg.departure.to_string(),
            route: hop.leg.route.clone(),
            stop: hop.leg.stop.clone(),
            arrival: hop.leg.arrival.to_string(),
            destination: hop.leg.destination.to_string(),
        }
    }
}

/// Result of a trip search.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripResponse {
    pub source: String,
    pub destination: String,

    /// True when no route was found
    pub route_end_found: bool,

    /// Human-readable description; absent when no route was found
    pub summary: Option<String>,

    /// Stations passed through, origin first
    pub stations: Vec<String>,

    pub legs: Vec<LegResult>,
    pub trip_types: Vec<String>,
}

impl TripResponse {
    pub fn from_outcome(outcome: &TripOutcome) -> Self {
        Self {
            source: outcome.source.to_string(),
            destination: outcome.destination.to_string(),
            route_end_found: outcome.route_end_found,
            summary: outcome.summary(),
            stations: outcome.stations().iter().map(ToString::to_string).collect(),
            legs: outcome.legs.iter().map(LegResult::from_hop).collect(),
            trip_types: outcome.trip_types.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Station details, returned when no destination is given.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationResponse {
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    pub departure_times: Vec<String>,
    pub trip_types: Vec<String>,
}

impl StationResponse {
    pub fn from_info(info: &StationInfo) -> Self {
        Self {
            name: info.name.to_string(),
            longitude: info.coordinates.longitude,
            latitude: info.coordinates.latitude,
            departure_times: info.departure_times.iter().map(ToString::to_string).collect(),
            trip_types: TripType::ALL.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
