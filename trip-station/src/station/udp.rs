//! UDP plumbing: sending tokens and the receive loop.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tracing::{debug, trace, warn};

use crate::protocol::{RouteToken, Transport, TransportError};

use super::actor::StationHandle;
use super::error::StationError;

/// Bind a UDP socket for station-to-station traffic.
pub async fn bind(addr: SocketAddr) -> Result<UdpSocket, StationError> {
    UdpSocket::bind(addr)
        .await
        .map_err(|source| StationError::Bind { addr, source })
}

/// Sends tokens as single JSON datagrams from the station's own socket, so
/// receivers see the station's advertised address as the source.
#[derive(Debug, Clone)]
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
    max_message_size: usize,
}

impl UdpTransport {
    pub fn new(socket: Arc<UdpSocket>, max_message_size: usize) -> Self {
        Self {
            socket,
            max_message_size,
        }
    }
}

impl Transport for UdpTransport {
    async fn send(&self, to: SocketAddr, token: &RouteToken) -> Result<(), TransportError> {
        let bytes = token.encode()?;
        if bytes.len() > self.max_message_size {
            return Err(TransportError::TooLarge {
                size: bytes.len(),
                limit: self.max_message_size,
            });
        }

        self.socket
            .send_to(&bytes, to)
            .await
            .map_err(|source| TransportError::Io { to, source })?;

        trace!(%to, bytes = bytes.len(), message_type = ?token.message_type, "sent token");
        Ok(())
    }
}

/// Decode datagrams from `socket` and hand them to the station.
///
/// Datagrams longer than `max_message_size` are truncated and so fail to
/// decode. Anything undecodable is logged and dropped. Returns once the
/// station has stopped.
pub async fn receive_loop(socket: Arc<UdpSocket>, max_message_size: usize, station: StationHandle) {
    let mut buf = vec![0u8; max_message_size];

    loop {
        let (len, from) = match socket.recv_from(&mut buf).await {
            Ok(received) => received,
            Err(e) => {
                warn!(error = %e, "UDP receive failed");
                continue;
            }
        };

        let token = match RouteToken::decode(&buf[..len]) {
            Ok(token) => token,
            Err(e) => {
                warn!(%from, bytes = len, error = %e, "dropping undecodable datagram");
                continue;
            }
        };

        trace!(%from, bytes = len, message_id = %token.message_id, "received token");
        if station.deliver(token, from).await.is_err() {
            debug!("station stopped; receive loop exiting");
            return;
        }
    }
}
