//! The station task: sole owner of the timetable and protocol state.
//!
//! Datagrams and client queries are queued on one inbox and processed
//! strictly one at a time, so the ledger and reply buffer need no locking.
//! A client query that floods stays parked here until its search
//! completes. There is no timeout: if a reply is lost the client waits
//! forever.

use std::collections::HashMap;
use std::net::SocketAddr;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::domain::{ClockTime, StationName};
use crate::protocol::{Completion, Engine, MessageId, RouteToken, SearchStart, Transport, TripOutcome, TripQuery};
use crate::timetable::{Coordinates, Refresh, TimetableSource};

use super::error::StationError;

type Reply<T> = oneshot::Sender<Result<T, StationError>>;

enum Event {
    Datagram { token: RouteToken, from: SocketAddr },
    Query { query: TripQuery, reply: Reply<TripOutcome> },
    Describe { reply: oneshot::Sender<StationInfo> },
}

/// Snapshot of a station for display.
#[derive(Debug, Clone, PartialEq)]
pub struct StationInfo {
    pub name: StationName,
    pub coordinates: Coordinates,
    pub udp_address: SocketAddr,
    pub neighbours: Vec<SocketAddr>,

    /// Distinct departure times in the current timetable.
    pub departure_times: Vec<ClockTime>,
}

/// Cloneable handle for talking to a running station.
#[derive(Debug, Clone)]
pub struct StationHandle {
    sender: mpsc::Sender<Event>,
}

impl StationHandle {
    /// Plan a trip from this station. Resolves when the search completes.
    pub async fn plan(&self, query: TripQuery) -> Result<TripOutcome, StationError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(Event::Query { query, reply })
            .await
            .map_err(|_| StationError::Stopped)?;
        response.await.map_err(|_| StationError::Stopped)?
    }

    pub async fn describe(&self) -> Result<StationInfo, StationError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(Event::Describe { reply })
            .await
            .map_err(|_| StationError::Stopped)?;
        response.await.map_err(|_| StationError::Stopped)
    }

    /// Queue a token received from `from`.
    pub async fn deliver(&self, token: RouteToken, from: SocketAddr) -> Result<(), StationError> {
        self.sender
            .send(Event::Datagram { token, from })
            .await
            .map_err(|_| StationError::Stopped)
    }
}

/// Start the station task and return a handle to it.
pub fn spawn<T>(engine: Engine<T>, source: TimetableSource, capacity: usize) -> StationHandle
where
    T: Transport + 'static,
{
    let (sender, inbox) = mpsc::channel(capacity);
    let station = StationNode {
        engine,
        source,
        inbox,
        waiting: HashMap::new(),
    };
    tokio::spawn(station.run());
    StationHandle { sender }
}

struct StationNode<T> {
    engine: Engine<T>,
    source: TimetableSource,
    inbox: mpsc::Receiver<Event>,

    /// Clients whose searches are still in flight, by search id.
    waiting: HashMap<MessageId, Reply<TripOutcome>>,
}

impl<T: Transport> StationNode<T> {
    async fn run(mut self) {
        info!(station = %self.engine.node().name, address = %self.engine.node().address, "station running");

        while let Some(event) = self.inbox.recv().await {
            self.refresh_timetable();
            match event {
                Event::Datagram { token, from } => self.on_datagram(token, from).await,
                Event::Query { query, reply } => self.on_query(query, reply).await,
                Event::Describe { reply } => {
                    let _ = reply.send(self.describe());
                }
            }
        }

        info!(station = %self.engine.node().name, "station stopped");
    }

    fn refresh_timetable(&mut self) {
        if let Refresh::Reloaded = self.source.refresh() {
            self.engine.replace_timetable(self.source.timetable().clone());
        }
    }

    async fn on_query(&mut self, query: TripQuery, reply: Reply<TripOutcome>) {
        debug!(
            station = %self.engine.node().name,
            destination = %query.destination,
            time = %query.time,
            "trip query"
        );
        match self.engine.start_search(query).await {
            Ok(SearchStart::Finished(outcome)) => respond(reply, Ok(outcome)),
            Ok(SearchStart::Pending(search)) => {
                self.waiting.insert(search, reply);
            }
            Err(e) => respond(reply, Err(e.into())),
        }
    }

    async fn on_datagram(&mut self, token: RouteToken, from: SocketAddr) {
        match self.engine.handle_token(token, from).await {
            Ok(None) => {}
            Ok(Some(Completion { search, outcome })) => match self.waiting.remove(&search) {
                Some(reply) => respond(reply, Ok(outcome)),
                None => warn!(message_id = %search, "search completed with no waiting client"),
            },
            Err(e) => match e.search().and_then(|s| self.waiting.remove(&s)) {
                Some(reply) => respond(reply, Err(e.into())),
                None => warn!(%from, error = %e, "dropping token"),
            },
        }
    }

    fn describe(&self) -> StationInfo {
        let node = self.engine.node();
        StationInfo {
            name: node.name.clone(),
            coordinates: node.timetable.coordinates,
            udp_address: node.address,
            neighbours: node.neighbours.clone(),
            departure_times: node.timetable.departure_times(),
        }
    }
}

fn respond<T>(reply: Reply<T>, result: Result<T, StationError>) {
    if reply.send(result).is_err() {
        debug!("client went away before its result was ready");
    }
}
