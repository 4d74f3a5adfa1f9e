//! Error types for kvwire-client

use std::time::Duration;
use thiserror::Error;

/// Result type alias for kvwire-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in kvwire-client
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Transport-level IO failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wire-protocol failure from kvwire-core.
    #[error("protocol error: {0}")]
    Protocol(#[from] kvwire_core::Error),

    /// The server answered a command with an error reply.
    #[error("server error: {0}")]
    Server(String),

    /// The server rejected the AUTH handshake.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The server closed the connection.
    #[error("connection closed by server")]
    ConnectionClosed,

    /// Establishing the transport took longer than `connect_timeout`.
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// A reply did not arrive within `response_timeout`.
    #[error("response timed out after {0:?}")]
    ResponseTimeout(Duration),

    /// A subscriber operation was attempted with no active subscription.
    #[error("not subscribed to any channel")]
    NotSubscribed,

    /// The server closed the connection while a subscription was active.
    #[error("subscription stream closed")]
    SubscriptionClosed,

    /// Configuration could not be loaded or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}
