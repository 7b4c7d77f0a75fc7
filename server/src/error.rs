//! Error types for the transport and server layers.

use std::io;
use thiserror::Error;

/// Failures of the pub/sub transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to reach broker {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to subscribe to {topic}: {source}")]
    Subscribe {
        topic: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode envelope: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("transport closed")]
    Closed,
    #[error("publish rejected by transport")]
    Rejected,
}

/// Failures surfaced by the server loop.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),
}
