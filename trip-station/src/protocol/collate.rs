//! Choosing one sibling reply to stand for a completed fan-out.

use crate::domain::{ClockTime, TripType};

use super::token::{MessageType, RouteToken};

/// Pick the reply that best answers the search from `siblings`, the
/// buffered replies to one station's fan-out.
///
/// Replies marked as dead ends are ignored. If nothing usable remains the
/// result is `trigger` (the reply that completed the fan-out) marked as a
/// dead end, so the station can still answer its parent.
pub fn collate(trip_type: TripType, trigger: &RouteToken, siblings: Vec<RouteToken>) -> RouteToken {
    let chosen = match trip_type {
        TripType::FastestTrip => fastest(siblings),
    };

    chosen.unwrap_or_else(|| {
        let mut dead_end = trigger.clone();
        dead_end.route_end_found = true;
        dead_end.message_type = MessageType::Incoming;
        dead_end
    })
}

/// The reply arriving earliest at the destination. Ties go to the reply
/// received first.
fn fastest(siblings: Vec<RouteToken>) -> Option<RouteToken> {
    let mut best: Option<(ClockTime, RouteToken)> = None;

    for reply in siblings.into_iter().filter(|t| !t.route_end_found) {
        let Some(arrival) = arrival_at_destination(&reply) else {
            continue;
        };
        if best.as_ref().is_none_or(|(t, _)| arrival < *t) {
            best = Some((arrival, reply));
        }
    }

    best.map(|(_, reply)| reply)
}

/// Earliest arrival at the destination among the last visit's candidates.
fn arrival_at_destination(token: &RouteToken) -> Option<ClockTime> {
    token
        .route
        .last()?
        .earliest_trips
        .iter()
        .filter(|leg| leg.goes_to(&token.destination_name))
        .map(|leg| leg.arrival)
        .min()
}
