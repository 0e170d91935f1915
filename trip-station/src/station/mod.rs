//! A running station: the protocol engine behind a task, fed from UDP.

mod actor;
mod error;
mod udp;

pub use actor::{StationHandle, StationInfo, spawn};
pub use error::StationError;
pub use udp::{UdpTransport, bind, receive_loop};

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tracing::warn;

use crate::config::StationConfig;
use crate::domain::StationName;
use crate::protocol::{Engine, Node};
use crate::timetable::TimetableSource;

/// Limits applied to a running station.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_message_size: usize,
    pub channel_capacity: usize,
}

impl From<&StationConfig> for Limits {
    fn from(config: &StationConfig) -> Self {
        Self {
            max_message_size: config.max_message_size,
            channel_capacity: config.channel_capacity,
        }
    }
}

/// Load the timetable, bind the UDP socket and start the station.
///
/// Fails if the timetable cannot be read or the socket cannot be bound.
pub async fn start(config: &StationConfig) -> Result<StationHandle, StationError> {
    let source = TimetableSource::open(config.timetable_path())?;
    let socket = bind(config.udp_address()).await?;
    launch(
        config.name.clone(),
        socket,
        config.neighbour_addresses(),
        source,
        Limits::from(config),
    )
}

/// Start a station on an already bound socket.
///
/// The socket must be bound to a concrete address, not a wildcard.
pub fn launch(
    name: StationName,
    socket: UdpSocket,
    neighbours: Vec<SocketAddr>,
    source: TimetableSource,
    limits: Limits,
) -> Result<StationHandle, StationError> {
    let address = socket.local_addr().map_err(StationError::LocalAddress)?;
    // Ledger edges are keyed by this address and matched against reply sources
    if address.ip().is_unspecified() {
        return Err(StationError::UnspecifiedAddress(address));
    }

    if source.timetable().station != name {
        warn!(
            station = %name,
            timetable_station = %source.timetable().station,
            path = %source.path().display(),
            "timetable header names a different station"
        );
    }

    let socket = Arc::new(socket);
    let transport = UdpTransport::new(Arc::clone(&socket), limits.max_message_size);
    let node = Node::new(name, address, neighbours, source.timetable().clone());
    let handle = spawn(Engine::new(node, transport), source, limits.channel_capacity);

    tokio::spawn(receive_loop(socket, limits.max_message_size, handle.clone()));
    Ok(handle)
}
