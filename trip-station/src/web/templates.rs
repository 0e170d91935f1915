//! Askama templates for the station page.

use askama::Template;

use crate::domain::TripType;
use crate::protocol::TripOutcome;
use crate::station::StationInfo;

/// The station page: search form and, after a search, its result.
#[derive(Template)]
#[template(path = "station.html")]
pub struct StationTemplate {
    pub station: StationView,
    pub form: FormView,
    pub result: Option<TripView>,
}

/// Error page.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub message: String,
}

/// Station view model for templates.
#[derive(Debug, Clone)]
pub struct StationView {
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    pub departure_times: Vec<String>,
    pub trip_types: Vec<String>,
}

impl StationView {
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

/// Values to prefill the search form with.
#[derive(Debug, Clone, Default)]
pub struct FormView {
    pub to: String,
    pub time: String,
    pub trip_type: String,
}

impl FormView {
    /// Whether `time` is the option the form should select.
    pub fn is_selected_time(&self, time: &str) -> bool {
        self.time == time
    }

    pub fn is_selected_trip_type(&self, trip_type: &str) -> bool {
        self.trip_type == trip_type
    }
}

/// Trip leg view model for templates.
#[derive(Debug, Clone)]
pub struct LegView {
    pub station: String,
    pub departure: String,
    pub route: String,
    pub stop: String,
    pub arrival: String,
    pub destination: String,
}

/// Search result view model for templates.
#[derive(Debug, Clone)]
pub struct TripView {
    pub destination: String,
    pub found: bool,
    pub summary: String,
    pub legs: Vec<LegView>,
}

impl TripView {
    pub fn from_outcome(outcome: &TripOutcome) -> Self {
        let legs = outcome
            .legs
            .iter()
            .map(|hop| LegView {
                station: hop.station.to_string(),
                departure: hop.leg.departure.to_string(),
                route: hop.leg.route.clone(),
                stop: hop.leg.stop.clone(),
                arrival: hop.leg.arrival.to_string(),
                destination: hop.leg.destination.to_string(),
            })
            .collect();

        Self {
            destination: outcome.destination.to_string(),
            found: outcome.is_found(),
            summary: outcome
                .summary()
                .unwrap_or_else(|| format!("No route found to {}.", outcome.destination)),
            legs,
        }
    }
}
