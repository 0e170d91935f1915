//! The result of a search as handed to the client-facing layer.

use serde::Serialize;

use crate::domain::{StationName, TripLeg, TripType};

use super::token::RouteToken;

/// One leg of a found trip, boarded at `station`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HopLeg {
    pub station: StationName,
    pub leg: TripLeg,
}

/// Result of a completed search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripOutcome {
    pub source: StationName,
    pub destination: StationName,

    /// True when no route to the destination was found.
    pub route_end_found: bool,

    /// Legs in travel order; empty when no route was found.
    pub legs: Vec<HopLeg>,

    /// Trip types the client may choose from.
    pub trip_types: Vec<TripType>,
}

impl TripOutcome {
    /// Read the result out of a token that has been matched.
    ///
    /// Every visit must retain exactly the leg to the next station; a token
    /// that is marked as a dead end, or whose chain is broken, yields
    /// "no route".
    pub fn from_token(token: &RouteToken) -> Self {
        if token.route_end_found {
            return Self::no_route(token.source_name.clone(), token.destination_name.clone());
        }

        let legs: Vec<HopLeg> = token
            .route
            .iter()
            .filter_map(|visit| {
                visit.earliest_trips.first().map(|leg| HopLeg {
                    station: visit.station_name.clone(),
                    leg: leg.clone(),
                })
            })
            .collect();

        if legs.is_empty() || legs.len() != token.route.len() {
            return Self::no_route(token.source_name.clone(), token.destination_name.clone());
        }

        Self {
            source: token.source_name.clone(),
            destination: token.destination_name.clone(),
            route_end_found: false,
            legs,
            trip_types: TripType::ALL.to_vec(),
        }
    }

    pub fn no_route(source: StationName, destination: StationName) -> Self {
        Self {
            source,
            destination,
            route_end_found: true,
            legs: Vec::new(),
            trip_types: TripType::ALL.to_vec(),
        }
    }

    pub fn is_found(&self) -> bool {
        !self.route_end_found
    }

    /// One-line description of the trip, or `None` if no route was found.
    pub fn summary(&self) -> Option<String> {
        let first = self.legs.first()?;
        let last = self.legs.last()?;
        Some(format!(
            "Depart from {} ({}) at {} taking {} and eventually arrive at {} at {}.",
            self.source,
            first.leg.stop,
            first.leg.departure,
            first.leg.route,
            self.destination,
            last.leg.arrival,
        ))
    }

    /// Stations passed through, origin to destination. Only the origin when
    /// no route was found.
    pub fn stations(&self) -> Vec<&StationName> {
        if self.legs.is_empty() {
            return vec![&self.source];
        }
        self.legs
            .iter()
            .map(|hop| &hop.station)
            .chain(self.legs.last().map(|hop| &hop.leg.destination))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ClockTime;
    use crate::protocol::token::{MessageId, MessageType, StationVisit};
    use std::net::SocketAddr;

    fn time(s: &str) -> ClockTime {
        ClockTime::parse_hhmm(s).unwrap()
    }

    fn station(s: &str) -> StationName {
        StationName::parse(s).unwrap()
    }

    fn visit(name: &str, port: u16, trips: Vec<TripLeg>) -> StationVisit {
        StationVisit {
            station_name: station(name),
            message_id: MessageId::new(),
            station_udp_address: SocketAddr::from(([127, 0, 0, 1], port)),
            earliest_trips: trips,
        }
    }

    fn matched_token() -> RouteToken {
        RouteToken {
            source_name: station("Alpha"),
            destination_name: station("Gamma"),
            route: vec![
                visit("Alpha", 6001, vec![TripLeg::new(time("09:00"), "Bus_1", "Stop1", time("09:20"), station("Beta"))]),
                visit("Beta", 6002, vec![TripLeg::new(time("09:30"), "Train_2", "Platform2", time("09:50"), station("Gamma"))]),
            ],
            trip_type: TripType::FastestTrip,
            hop_count: 0,
            time: time("08:00"),
            message_id: MessageId::new(),
            message_type: MessageType::Incoming,
            route_end_found: false,
        }
    }

    #[test]
    fn found_route() {
        let outcome = TripOutcome::from_token(&matched_token());

        assert!(outcome.is_found());
        assert_eq!(outcome.legs.len(), 2);
        assert_eq!(
            outcome.stations(),
            vec![&station("Alpha"), &station("Beta"), &station("Gamma")]
        );
        assert_eq!(outcome.trip_types, vec![TripType::FastestTrip]);
        assert_eq!(
            outcome.summary().unwrap(),
            "Depart from Alpha (Stop1) at 09:00 taking Bus_1 and eventually arrive at Gamma at 09:50."
        );
    }

    #[test]
    fn dead_end_token_is_no_route() {
        let mut token = matched_token();
        token.route_end_found = true;

        let outcome = TripOutcome::from_token(&token);
        assert!(!outcome.is_found());
        assert!(outcome.legs.is_empty());
        assert!(outcome.summary().is_none());
        assert_eq!(outcome.stations(), vec![&station("Alpha")]);
    }

    #[test]
    fn broken_chain_is_no_route() {
        let mut token = matched_token();
        token.route[1].earliest_trips.clear();
        assert!(!TripOutcome::from_token(&token).is_found());
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(TripOutcome::from_token(&matched_token())).unwrap();
        assert_eq!(json["routeEndFound"], false);
        assert_eq!(json["tripTypes"][0], "FastestTrip");
        assert_eq!(json["legs"][1]["station"], "Beta");
        assert_eq!(json["legs"][1]["leg"]["arrival"], "09:50");
    }
}
