//! Client queries.

use crate::domain::{ClockTime, InvalidStationName, StationName, TimeError, TripType, UnknownTripType};

/// Error parsing client query parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("destination: {0}")]
    Destination(#[from] InvalidStationName),

    #[error(transparent)]
    Time(#[from] TimeError),

    #[error(transparent)]
    TripType(#[from] UnknownTripType),
}

/// A search request from a client at this station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripQuery {
    pub destination: StationName,

    /// Earliest departure from this station.
    pub time: ClockTime,

    pub trip_type: TripType,
}

impl TripQuery {
    pub fn new(destination: StationName, time: ClockTime, trip_type: TripType) -> Self {
        Self {
            destination,
            time,
            trip_type,
        }
    }

    /// Build a query from raw parameters.
    ///
    /// `time` defaults to the current local time and `trip_type` to
    /// [`TripType::FastestTrip`]. Empty values count as absent.
    pub fn from_params(
        to: &str,
        time: Option<&str>,
        trip_type: Option<&str>,
    ) -> Result<Self, QueryError> {
        let destination = StationName::parse(to)?;

        let time = match time.filter(|s| !s.is_empty()) {
            Some(s) => ClockTime::parse_hhmm(s)?,
            None => ClockTime::now_local(),
        };

        let trip_type = match trip_type.filter(|s| !s.is_empty()) {
            Some(s) => s.parse()?,
            None => TripType::default(),
        };

        Ok(Self::new(destination, time, trip_type))
    }
}
