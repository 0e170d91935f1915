//! In-memory timetable and the earliest-trip lookup.

use std::collections::HashSet;

use crate::domain::{ClockTime, StationName, TripLeg};

/// Geographic position of a station, as given in the timetable header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

/// A station's timetable: every leg departing from it, in file order.
///
/// Files are expected to list legs in ascending departure order; the
/// earliest-trip lookup relies on that.
#[derive(Debug, Clone, PartialEq)]
pub struct Timetable {
    /// Station named in the file header.
    pub station: StationName,

    /// Station position from the file header.
    pub coordinates: Coordinates,

    legs: Vec<TripLeg>,
}

impl Timetable {
    /// Create a timetable from legs already in departure order.
    pub fn new(station: StationName, coordinates: Coordinates, legs: Vec<TripLeg>) -> Self {
        Self {
            station,
            coordinates,
            legs,
        }
    }

    #[cfg(test)]
    pub(crate) fn legs(&self) -> &[TripLeg] {
        &self.legs
    }

    /// Returns the number of legs.
    pub fn len(&self) -> usize {
        self.legs.len()
    }

    /// Check if the timetable has no legs.
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Departure times of every leg, without duplicates, in file order.
    pub fn departure_times(&self) -> Vec<ClockTime> {
        let mut seen = HashSet::new();
        self.legs
            .iter()
            .map(|leg| leg.departure)
            .filter(|t| seen.insert(*t))
            .collect()
    }

    /// The earliest leg to each distinct destination departing at or after `cutoff`.
    ///
    /// Legs are scanned in file order and the first eligible leg per
    /// destination is kept, so the result is also in file order. An empty
    /// result means nothing leaves this station after `cutoff`.
    ///
    /// # Examples
    ///
    /// ```
    /// use trip_station::domain::{ClockTime, StationName, TripLeg};
    /// use trip_station::timetable::{Coordinates, Timetable};
    ///
    /// let t = |s| ClockTime::parse_hhmm(s).unwrap();
    /// let beta = StationName::parse("Beta").unwrap();
    /// let timetable = Timetable::new(
    ///     StationName::parse("Alpha").unwrap(),
    ///     Coordinates { longitude: 0.0, latitude: 0.0 },
    ///     vec![
    ///         TripLeg::new(t("09:00"), "Bus_1", "Stop1", t("09:20"), beta.clone()),
    ///         TripLeg::new(t("09:05"), "Bus_2", "Stop1", t("09:25"), beta.clone()),
    ///     ],
    /// );
    ///
    /// let trips = timetable.earliest_trips(t("08:00"));
    /// assert_eq!(trips.len(), 1);
    /// assert_eq!(trips[0].departure, t("09:00"));
    ///
    /// assert!(timetable.earliest_trips(t("10:00")).is_empty());
    /// ```
    pub fn earliest_trips(&self, cutoff: ClockTime) -> Vec<TripLeg> {
        let mut seen: HashSet<&StationName> = HashSet::new();
        self.legs
            .iter()
            .filter(|leg| leg.departure >= cutoff)
            .filter(|leg| seen.insert(&leg.destination))
            .cloned()
            .collect()
    }
}
