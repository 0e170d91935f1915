//! How the engine sends tokens to other stations.

use std::future::Future;
use std::net::SocketAddr;

use super::token::RouteToken;

/// A token could not be sent. Sends are best effort and never retried.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to encode token: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("encoded token is {size} bytes, over the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("send to {to} failed: {source}")]
    Io {
        to: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Delivers tokens to other stations.
///
/// This abstraction allows the engine to be tested without sockets.
pub trait Transport: Send + Sync {
    /// Send one token to the station at `to`.
    fn send(
        &self,
        to: SocketAddr,
        token: &RouteToken,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}
