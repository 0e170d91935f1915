//! The protocol engine: one station's reaction to each inbound event.
//!
//! A search floods outward from its origin. Every station that the flood
//! reaches extends the token with its own earliest trips and then either
//! reports straight back (it is the destination, it is not on a useful
//! path, it can reach the destination directly, or it is a dead end) or
//! floods further and records one pending edge per neighbour it sent to.
//!
//! Replies travel back the same way. A station buffers each reply and
//! consumes its pending edge; when the last edge of a fan-out has replied,
//! the buffered siblings are collated into a single token which is sent one
//! hop further back. At the origin the collated token completes the search.
//!
//! The engine is not thread safe and does not need to be: the station actor
//! owns it and feeds it one event at a time.

use std::net::SocketAddr;

use futures::future::join_all;
use tracing::{debug, error, warn};

use crate::timetable::Timetable;

use super::bank::ReplyBuffer;
use super::collate::collate;
use super::error::ProtocolError;
use super::ledger::{Ledger, PendingEdge};
use super::node::Node;
use super::outcome::TripOutcome;
use super::query::TripQuery;
use super::token::{MessageId, MessageType, RouteToken};
use super::transport::Transport;

/// How a client query proceeds after it reaches the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStart {
    /// Answered without contacting any other station.
    Finished(TripOutcome),
    /// Flooded; the result arrives later as a [`Completion`].
    Pending(MessageId),
}

/// A search that has finished at its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub search: MessageId,
    pub outcome: TripOutcome,
}

/// Protocol state for one station.
pub struct Engine<T> {
    node: Node,
    transport: T,
    ledger: Ledger,
    bank: ReplyBuffer,
}

impl<T: Transport> Engine<T> {
    pub fn new(node: Node, transport: T) -> Self {
        Self {
            node,
            transport,
            ledger: Ledger::new(),
            bank: ReplyBuffer::new(),
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Pending edges across all searches passing through this station.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Number of replies waiting for their siblings.
    pub fn buffered_replies(&self) -> usize {
        self.bank.len()
    }

    /// Use a freshly loaded timetable for all subsequent decisions.
    pub fn replace_timetable(&mut self, timetable: Timetable) {
        self.node.timetable = timetable;
    }

    /// Begin a search at this station.
    pub async fn start_search(&mut self, query: TripQuery) -> Result<SearchStart, ProtocolError> {
        if query.destination == self.node.name {
            return Err(ProtocolError::InvalidQuery(format!(
                "already at {}",
                query.destination
            )));
        }

        let mut token =
            RouteToken::originate(&self.node, query.destination, query.trip_type, query.time);
        let search = token.message_id;

        if token.find_destination(0).is_some() {
            debug!(station = %self.node.name, message_id = %search, "destination reachable directly");
            token.match_route();
            return Ok(SearchStart::Finished(TripOutcome::from_token(&token)));
        }

        if token.route_end(&self.node)? {
            debug!(station = %self.node.name, message_id = %search, "origin is a dead end");
            return Ok(SearchStart::Finished(self.no_route(&token)));
        }

        let sent = self.flood(&token).await?;
        if sent == 0 {
            debug!(station = %self.node.name, message_id = %search, "no neighbour accepted the search");
            return Ok(SearchStart::Finished(self.no_route(&token)));
        }

        debug!(station = %self.node.name, message_id = %search, sent, "search flooded");
        Ok(SearchStart::Pending(search))
    }

    /// React to a token received from the station at `from`.
    ///
    /// Returns a [`Completion`] when the token finishes a search that
    /// started here.
    pub async fn handle_token(
        &mut self,
        token: RouteToken,
        from: SocketAddr,
    ) -> Result<Option<Completion>, ProtocolError> {
        match token.message_type {
            MessageType::Outgoing => {
                self.on_outgoing(token).await?;
                Ok(None)
            }
            MessageType::Incoming => self.on_incoming(token, from).await,
        }
    }

    async fn on_outgoing(&mut self, mut token: RouteToken) -> Result<(), ProtocolError> {
        if token.destination_name == self.node.name {
            debug!(station = %self.node.name, message_id = %token.message_id, "reached destination by flood; bouncing");
            token.route_end_found = true;
            return self.send_to_parent(token, 0).await;
        }

        if !token.reaches_station(&self.node.name)? {
            debug!(station = %self.node.name, message_id = %token.message_id, "not on any candidate trip; bouncing");
            token.route_end_found = true;
            return self.send_to_parent(token, 0).await;
        }

        token.add_station_to_route(&self.node, MessageId::new())?;
        let found = token.find_destination(token.hop_count).is_some();
        let dead_end = token.route_end(&self.node)?;

        if found {
            // Even at a dead end a direct leg is still a valid answer
            debug!(station = %self.node.name, message_id = %token.message_id, dead_end, "destination reachable; reporting");
            token.retain_destination_trips()?;
            return self.send_to_parent(token, 1).await;
        }

        if !dead_end {
            let sent = self.flood(&token).await?;
            if sent > 0 {
                debug!(station = %self.node.name, message_id = %token.message_id, sent, "forwarded");
                return Ok(());
            }
        }

        debug!(station = %self.node.name, message_id = %token.message_id, "dead end; reporting");
        token.route_end_found = true;
        self.send_to_parent(token, 1).await
    }

    async fn on_incoming(
        &mut self,
        token: RouteToken,
        from: SocketAddr,
    ) -> Result<Option<Completion>, ProtocolError> {
        let hop = token.hop_count;
        let here = token.visit(hop)?;
        if here.station_name != self.node.name {
            return Err(ProtocolError::malformed(format!(
                "reply addressed to {} at hop {hop}",
                here.station_name
            )));
        }
        let fan_out = here.message_id;
        let parent = parent_address(&token)?;

        self.ledger
            .remove(parent, from, fan_out)
            .map_err(|violation| {
                error!(
                    station = %self.node.name,
                    message_id = %token.message_id,
                    error = %violation,
                    "reply for an edge that was never sent; abandoning search"
                );
                ProtocolError::Ledger {
                    search: token.message_id,
                    violation,
                }
            })?;

        let trigger = token.clone();
        self.bank.add(token);

        if self.ledger.has_outstanding(fan_out) {
            debug!(station = %self.node.name, message_id = %trigger.message_id, %from, "reply buffered; waiting for siblings");
            return Ok(None);
        }

        let siblings = self.bank.remove(hop, fan_out);
        let replies = siblings.len();
        let mut collated = collate(trigger.trip_type, &trigger, siblings);
        collated.match_route();

        if trigger.source_name == self.node.name {
            let outcome = TripOutcome::from_token(&collated);
            debug!(
                station = %self.node.name,
                message_id = %collated.message_id,
                replies,
                found = outcome.is_found(),
                "search complete"
            );
            return Ok(Some(Completion {
                search: collated.message_id,
                outcome,
            }));
        }

        debug!(
            station = %self.node.name,
            message_id = %collated.message_id,
            replies,
            route_end_found = collated.route_end_found,
            "collated; reporting"
        );
        self.send_to_parent(collated, 1).await?;
        Ok(None)
    }

    /// Send `token` to every neighbour not yet visited by the search and not
    /// already sent to for this fan-out. Returns how many sends succeeded;
    /// only those are recorded as pending.
    async fn flood(&mut self, token: &RouteToken) -> Result<usize, ProtocolError> {
        let fan_out = token.current_visit()?.message_id;
        let parent = parent_address(token)?;

        let targets: Vec<SocketAddr> = self
            .node
            .neighbours
            .iter()
            .copied()
            .filter(|n| !token.visited_address(*n) && !self.ledger.was_sent(fan_out, *n))
            .collect();

        let transport = &self.transport;
        let results = join_all(targets.iter().map(|to| transport.send(*to, token))).await;

        let mut sent = 0;
        for (to, result) in targets.into_iter().zip(results) {
            match result {
                Ok(()) => {
                    self.ledger.add(PendingEdge {
                        message_id: fan_out,
                        parent,
                        station: self.node.address,
                        destination: to,
                    });
                    sent += 1;
                }
                Err(e) => {
                    warn!(station = %self.node.name, message_id = %token.message_id, %to, error = %e, "flood send failed");
                }
            }
        }
        Ok(sent)
    }

    /// Turn `token` into a reply and send it to the station `deduct` hops
    /// back along the route.
    async fn send_to_parent(&self, mut token: RouteToken, deduct: usize) -> Result<(), ProtocolError> {
        token.message_type = MessageType::Incoming;
        token.hop_count = token.hop_count.checked_sub(deduct).ok_or_else(|| {
            ProtocolError::malformed(format!("cannot step back {deduct} hops from hop {}", token.hop_count))
        })?;
        let to = token.current_visit()?.station_udp_address;

        if let Err(e) = self.transport.send(to, &token).await {
            warn!(station = %self.node.name, message_id = %token.message_id, %to, error = %e, "reply send failed");
        }
        Ok(())
    }

    fn no_route(&self, token: &RouteToken) -> TripOutcome {
        TripOutcome::no_route(token.source_name.clone(), token.destination_name.clone())
    }
}

/// The station the current hop reports to, or `None` at the origin.
fn parent_address(token: &RouteToken) -> Result<Option<SocketAddr>, ProtocolError> {
    match token.hop_count.checked_sub(1) {
        None => Ok(None),
        Some(prev) => Ok(Some(token.visit(prev)?.station_udp_address)),
    }
}
