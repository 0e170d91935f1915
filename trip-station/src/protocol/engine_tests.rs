//! Multi-station tests for the protocol engine over an in-memory network.

use super::*;
use crate::domain::{ClockTime, StationName, TripLeg, TripType};
use crate::timetable::{Coordinates, Timetable};
use std::collections::{HashMap, HashSet, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

fn time(s: &str) -> ClockTime {
    ClockTime::parse_hhmm(s).unwrap()
}

fn station(s: &str) -> StationName {
    StationName::parse(s).unwrap()
}

fn addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

fn leg(dep: &str, route: &str, arr: &str, dest: &str) -> TripLeg {
    TripLeg::new(time(dep), route, "Stop1", time(arr), station(dest))
}

fn query(to: &str, at: &str) -> TripQuery {
    TripQuery::new(station(to), time(at), TripType::FastestTrip)
}

struct Datagram {
    from: SocketAddr,
    to: SocketAddr,
    token: RouteToken,
}

/// Delivery queue shared by every station in a test network.
#[derive(Default)]
struct Wire {
    queue: Mutex<VecDeque<Datagram>>,
    unreachable: Mutex<HashSet<SocketAddr>>,
    sends: Mutex<usize>,
}

impl Wire {
    fn pop(&self) -> Option<Datagram> {
        self.queue.lock().unwrap().pop_front()
    }

    fn is_empty(&self) -> bool {
        self.queue.lock().unwrap().is_empty()
    }

    fn send_count(&self) -> usize {
        *self.sends.lock().unwrap()
    }
}

/// Transport that enqueues tokens on the shared wire.
struct QueueTransport {
    from: SocketAddr,
    wire: Arc<Wire>,
}

impl Transport for QueueTransport {
    async fn send(&self, to: SocketAddr, token: &RouteToken) -> Result<(), TransportError> {
        if self.wire.unreachable.lock().unwrap().contains(&to) {
            return Err(TransportError::Io {
                to,
                source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "unreachable"),
            });
        }
        *self.wire.sends.lock().unwrap() += 1;
        self.wire.queue.lock().unwrap().push_back(Datagram {
            from: self.from,
            to,
            token: token.clone(),
        });
        Ok(())
    }
}

/// A set of stations wired together through one in-memory queue.
struct Network {
    wire: Arc<Wire>,
    engines: HashMap<SocketAddr, Engine<QueueTransport>>,
    ports: HashMap<&'static str, u16>,
}

impl Network {
    fn new() -> Self {
        Self {
            wire: Arc::new(Wire::default()),
            engines: HashMap::new(),
            ports: HashMap::new(),
        }
    }

    fn station(mut self, name: &'static str, port: u16, neighbours: &[u16], legs: Vec<TripLeg>) -> Self {
        let node = Node::new(
            station(name),
            addr(port),
            neighbours.iter().map(|p| addr(*p)).collect(),
            Timetable::new(
                station(name),
                Coordinates {
                    longitude: 0.0,
                    latitude: 0.0,
                },
                legs,
            ),
        );
        let transport = QueueTransport {
            from: addr(port),
            wire: Arc::clone(&self.wire),
        };
        self.engines.insert(addr(port), Engine::new(node, transport));
        self.ports.insert(name, port);
        self
    }

    fn unreachable(self, port: u16) -> Self {
        self.wire.unreachable.lock().unwrap().insert(addr(port));
        self
    }

    fn engine(&mut self, name: &str) -> &mut Engine<QueueTransport> {
        let port = self.ports[name];
        self.engines.get_mut(&addr(port)).unwrap()
    }

    /// Deliver queued datagrams until the network is quiet.
    async fn run(&mut self) -> Vec<Completion> {
        let mut completions = Vec::new();
        while let Some(d) = self.wire.pop() {
            // Datagrams to stations outside the network are lost
            let Some(engine) = self.engines.get_mut(&d.to) else {
                continue;
            };
            if let Some(done) = engine.handle_token(d.token, d.from).await.unwrap() {
                completions.push(done);
            }
        }
        completions
    }

    /// Start a search at `origin` and run it to completion.
    async fn search(&mut self, origin: &str, q: TripQuery) -> TripOutcome {
        match self.engine(origin).start_search(q).await.unwrap() {
            SearchStart::Finished(outcome) => outcome,
            SearchStart::Pending(id) => {
                let completions = self.run().await;
                assert_eq!(completions.len(), 1, "expected one completion");
                assert_eq!(completions[0].search, id);
                completions.into_iter().next().unwrap().outcome
            }
        }
    }

    /// Every edge opened has been answered and every reply collated.
    fn assert_quiescent(&self) {
        assert!(self.wire.is_empty());
        for engine in self.engines.values() {
            assert!(engine.ledger().is_empty(), "{} has pending edges", engine.node().name);
            assert_eq!(engine.buffered_replies(), 0, "{} has buffered replies", engine.node().name);
        }
    }
}

/// Alpha - Beta - Gamma in a line.
fn line() -> Network {
    Network::new()
        .station("Alpha", 6001, &[6002], vec![leg("09:00", "Bus_1", "09:20", "Beta")])
        .station("Beta", 6002, &[6001, 6003], vec![leg("09:30", "Train_2", "09:50", "Gamma")])
        .station("Gamma", 6003, &[6002], vec![])
}

fn names(outcome: &TripOutcome) -> Vec<&str> {
    outcome.stations().into_iter().map(StationName::as_str).collect()
}

#[tokio::test]
async fn line_of_three_finds_route() {
    let mut net = line();
    let outcome = net.search("Alpha", query("Gamma", "08:00")).await;

    assert!(outcome.is_found());
    assert!(!outcome.route_end_found);
    assert_eq!(names(&outcome), vec!["Alpha", "Beta", "Gamma"]);

    let summary = outcome.summary().unwrap();
    assert!(summary.contains("at 09:00"), "{summary}");
    assert!(summary.contains("at 09:50"), "{summary}");
    net.assert_quiescent();
}

#[tokio::test]
async fn after_last_departure_no_route_without_sending() {
    let mut net = line();
    let start = net.engine("Alpha").start_search(query("Gamma", "10:00")).await.unwrap();

    match start {
        SearchStart::Finished(outcome) => {
            assert!(outcome.route_end_found);
            assert!(outcome.summary().is_none());
        }
        other => panic!("expected immediate result, got {other:?}"),
    }
    assert_eq!(net.wire.send_count(), 0);
    net.assert_quiescent();
}

#[tokio::test]
async fn earliest_of_duplicate_legs_used() {
    let mut net = Network::new()
        .station(
            "Alpha",
            6001,
            &[6002],
            vec![leg("09:00", "Bus_1", "09:20", "Beta"), leg("09:05", "Bus_2", "09:25", "Beta")],
        )
        .station("Beta", 6002, &[6001, 6003], vec![leg("09:30", "Train_2", "09:50", "Gamma")])
        .station("Gamma", 6003, &[6002], vec![]);

    let outcome = net.search("Alpha", query("Gamma", "08:00")).await;

    assert_eq!(outcome.legs[0].leg.departure, time("09:00"));
    assert_eq!(outcome.legs[0].leg.route, "Bus_1");
    net.assert_quiescent();
}

#[tokio::test]
async fn direct_leg_answered_locally() {
    let mut net = Network::new()
        .station(
            "Alpha",
            6001,
            &[6002],
            vec![leg("09:00", "Bus_1", "09:20", "Beta"), leg("09:10", "Express", "09:40", "Gamma")],
        )
        .station("Beta", 6002, &[6001], vec![]);

    let start = net.engine("Alpha").start_search(query("Gamma", "08:00")).await.unwrap();
    let SearchStart::Finished(outcome) = start else {
        panic!("expected immediate result");
    };

    assert_eq!(names(&outcome), vec!["Alpha", "Gamma"]);
    assert_eq!(outcome.legs[0].leg.route, "Express");
    assert_eq!(net.wire.send_count(), 0);
}

#[tokio::test]
async fn destination_same_as_origin_rejected() {
    let mut net = line();
    let err = net.engine("Alpha").start_search(query("Alpha", "08:00")).await.unwrap_err();
    assert!(matches!(err, ProtocolError::InvalidQuery(_)));
}

#[tokio::test]
async fn collation_picks_fastest_branch() {
    // Alpha fans out to Beta and Delta; both reach Gamma, Delta sooner
    let mut net = Network::new()
        .station(
            "Alpha",
            6001,
            &[6002, 6004],
            vec![leg("09:00", "Bus_B", "09:20", "Beta"), leg("09:00", "Bus_D", "09:10", "Delta")],
        )
        .station("Beta", 6002, &[6001, 6003], vec![leg("09:30", "Slow", "10:00", "Gamma")])
        .station("Delta", 6004, &[6001, 6003], vec![leg("09:15", "Fast", "09:40", "Gamma")])
        .station("Gamma", 6003, &[6002, 6004], vec![]);

    let outcome = net.search("Alpha", query("Gamma", "08:00")).await;

    assert_eq!(names(&outcome), vec!["Alpha", "Delta", "Gamma"]);
    assert_eq!(outcome.legs[0].leg.route, "Bus_D");
    assert_eq!(outcome.legs[1].leg.arrival, time("09:40"));
    net.assert_quiescent();
}

#[tokio::test]
async fn multi_hop_collates_at_each_station() {
    let mut net = Network::new()
        .station("Alpha", 6001, &[6002], vec![leg("08:00", "A", "08:10", "Beta")])
        .station("Beta", 6002, &[6001, 6003], vec![leg("08:20", "B", "08:30", "Gamma")])
        .station("Gamma", 6003, &[6002, 6004], vec![leg("08:40", "C", "08:50", "Delta")])
        .station("Delta", 6004, &[6003], vec![]);

    let outcome = net.search("Alpha", query("Delta", "07:00")).await;

    assert_eq!(names(&outcome), vec!["Alpha", "Beta", "Gamma", "Delta"]);
    assert_eq!(
        outcome.summary().unwrap(),
        "Depart from Alpha (Stop1) at 08:00 taking A and eventually arrive at Delta at 08:50."
    );
    net.assert_quiescent();
}

#[tokio::test]
async fn dead_end_reported_as_no_route() {
    // Beta can only go back to Alpha
    let mut net = Network::new()
        .station("Alpha", 6001, &[6002], vec![leg("09:00", "Bus_1", "09:20", "Beta")])
        .station("Beta", 6002, &[6001, 6003], vec![leg("09:30", "Back", "09:50", "Alpha")])
        .station("Gamma", 6003, &[6002], vec![]);

    let outcome = net.search("Alpha", query("Gamma", "08:00")).await;

    assert!(outcome.route_end_found);
    assert!(outcome.legs.is_empty());
    net.assert_quiescent();
}

#[tokio::test]
async fn stations_off_the_candidate_trips_bounce() {
    // Beta floods to Gamma and Epsilon but only has a leg to Gamma
    let mut net = Network::new()
        .station("Alpha", 6001, &[6002], vec![leg("08:00", "A", "08:10", "Beta")])
        .station("Beta", 6002, &[6001, 6003, 6005], vec![leg("08:20", "B", "08:30", "Gamma")])
        .station("Gamma", 6003, &[6002, 6004], vec![leg("08:40", "C", "08:50", "Delta")])
        .station("Delta", 6004, &[6003], vec![])
        .station("Epsilon", 6005, &[6002], vec![leg("08:30", "E", "08:35", "Delta")]);

    let outcome = net.search("Alpha", query("Delta", "07:00")).await;

    assert_eq!(names(&outcome), vec!["Alpha", "Beta", "Gamma", "Delta"]);
    net.assert_quiescent();
}

#[tokio::test]
async fn flood_reaching_destination_bounces() {
    // Gamma is Alpha's neighbour but Alpha has no leg to it
    let mut net = Network::new()
        .station("Alpha", 6001, &[6002, 6003], vec![leg("09:00", "Bus_1", "09:20", "Beta")])
        .station("Beta", 6002, &[6001, 6003], vec![leg("09:30", "Train_2", "09:50", "Gamma")])
        .station("Gamma", 6003, &[6001, 6002], vec![]);

    let outcome = net.search("Alpha", query("Gamma", "08:00")).await;

    assert_eq!(names(&outcome), vec!["Alpha", "Beta", "Gamma"]);
    net.assert_quiescent();
}

#[tokio::test]
async fn destination_found_at_dead_end_still_reported() {
    // Beta's only neighbour is Alpha, but it has a leg to Gamma
    let mut net = Network::new()
        .station("Alpha", 6001, &[6002], vec![leg("09:00", "Bus_1", "09:20", "Beta")])
        .station("Beta", 6002, &[6001], vec![leg("09:30", "Train_2", "09:50", "Gamma")]);

    let outcome = net.search("Alpha", query("Gamma", "08:00")).await;

    assert!(outcome.is_found());
    assert_eq!(names(&outcome), vec!["Alpha", "Beta", "Gamma"]);
    net.assert_quiescent();
}

#[tokio::test]
async fn failed_send_not_counted_as_pending() {
    let mut net = Network::new()
        .station("Alpha", 6001, &[6002, 6009], vec![leg("09:00", "Bus_1", "09:20", "Beta")])
        .station("Beta", 6002, &[6001, 6003], vec![leg("09:30", "Train_2", "09:50", "Gamma")])
        .station("Gamma", 6003, &[6002], vec![])
        .unreachable(6009);

    let start = net.engine("Alpha").start_search(query("Gamma", "08:00")).await.unwrap();
    assert!(matches!(start, SearchStart::Pending(_)));
    assert_eq!(net.engine("Alpha").ledger().len(), 1);

    let completions = net.run().await;
    assert_eq!(completions.len(), 1);
    assert!(completions[0].outcome.is_found());
    net.assert_quiescent();
}

#[tokio::test]
async fn all_sends_failing_is_no_route() {
    let mut net = Network::new()
        .station("Alpha", 6001, &[6002], vec![leg("09:00", "Bus_1", "09:20", "Beta")])
        .unreachable(6002);

    let start = net.engine("Alpha").start_search(query("Gamma", "08:00")).await.unwrap();
    match start {
        SearchStart::Finished(outcome) => assert!(outcome.route_end_found),
        other => panic!("expected immediate result, got {other:?}"),
    }
    assert!(net.engine("Alpha").ledger().is_empty());
}

#[tokio::test]
async fn lost_reply_leaves_search_pending() {
    // Gamma is outside the network, so Beta's flood to it never answers
    let mut net = Network::new()
        .station("Alpha", 6001, &[6002], vec![leg("08:00", "A", "08:10", "Beta")])
        .station("Beta", 6002, &[6001, 6003], vec![leg("08:20", "B", "08:30", "Gamma")]);

    let start = net.engine("Alpha").start_search(query("Delta", "07:00")).await.unwrap();
    assert!(matches!(start, SearchStart::Pending(_)));

    assert!(net.run().await.is_empty());
    assert_eq!(net.engine("Alpha").ledger().len(), 1);
    assert_eq!(net.engine("Beta").ledger().len(), 1);
}

#[tokio::test]
async fn unrecorded_reply_is_ledger_violation() {
    let mut net = line();
    let alpha = net.engine("Alpha");
    let mut stray = RouteToken::originate(alpha.node(), station("Gamma"), TripType::FastestTrip, time("08:00"));
    stray.message_type = MessageType::Incoming;
    let search = stray.message_id;

    let err = alpha.handle_token(stray, addr(6002)).await.unwrap_err();

    assert_eq!(err.search(), Some(search));
    match err {
        ProtocolError::Ledger { violation, .. } => {
            assert_eq!(violation.parent, None);
            assert_eq!(violation.neighbour, addr(6002));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(alpha.buffered_replies(), 0);
}

#[tokio::test]
async fn reply_for_another_station_is_malformed() {
    let mut net = line();
    let beta_node = net.engine("Beta").node().clone();
    let mut misrouted = RouteToken::originate(&beta_node, station("Gamma"), TripType::FastestTrip, time("08:00"));
    misrouted.message_type = MessageType::Incoming;

    let err = net.engine("Alpha").handle_token(misrouted, addr(6002)).await.unwrap_err();
    assert!(matches!(err, ProtocolError::MalformedToken(_)));
    assert_eq!(err.search(), None);
}

#[tokio::test]
async fn concurrent_searches_do_not_interfere() {
    let mut net = Network::new()
        .station("Alpha", 6001, &[6002], vec![leg("09:00", "Bus_1", "09:20", "Beta")])
        .station(
            "Beta",
            6002,
            &[6001, 6003, 6004],
            vec![leg("09:30", "To_Gamma", "09:50", "Gamma"), leg("09:35", "To_Delta", "10:10", "Delta")],
        )
        .station("Gamma", 6003, &[6002], vec![])
        .station("Delta", 6004, &[6002], vec![]);

    let first = net.engine("Alpha").start_search(query("Gamma", "08:00")).await.unwrap();
    let second = net.engine("Alpha").start_search(query("Delta", "08:00")).await.unwrap();
    let (SearchStart::Pending(a), SearchStart::Pending(b)) = (first, second) else {
        panic!("expected both searches to flood");
    };

    let completions = net.run().await;
    assert_eq!(completions.len(), 2);

    let by_id: HashMap<MessageId, &TripOutcome> =
        completions.iter().map(|c| (c.search, &c.outcome)).collect();
    assert_eq!(names(by_id[&a]), vec!["Alpha", "Beta", "Gamma"]);
    assert_eq!(names(by_id[&b]), vec!["Alpha", "Beta", "Delta"]);
    net.assert_quiescent();
}

#[tokio::test]
async fn reloaded_timetable_used_for_next_search() {
    let mut net = line();
    let late = Timetable::new(
        station("Alpha"),
        Coordinates {
            longitude: 0.0,
            latitude: 0.0,
        },
        vec![leg("11:00", "Late_Bus", "11:20", "Beta")],
    );
    net.engine("Alpha").replace_timetable(late);

    let start = net.engine("Alpha").start_search(query("Gamma", "10:00")).await.unwrap();
    assert!(matches!(start, SearchStart::Pending(_)));

    // Beta's only leg left at 09:30, before the 11:20 arrival
    let completions = net.run().await;
    assert!(completions[0].outcome.route_end_found);
    net.assert_quiescent();
}
