//! # kvwire-client
//!
//! Async client for Redis-like key-value stores speaking a RESP
//! request/response protocol.
//!
//! This crate provides:
//! - A typed command surface over keys, strings, sets, hashes, and lists
//! - Pub/sub on a dedicated subscriber connection
//! - A transport seam ([`transport::Connector`]) so tests and embedders
//!   can inject their own byte streams instead of TCP
//! - Idle-connection recycling via [`pool::Pool`]
//!
//! # Example
//!
//! ```rust,ignore
//! use kvwire_client::{Client, ClientConfig};
//!
//! let config = ClientConfig::new("127.0.0.1", 6379).password("secret");
//! let mut client = Client::connect(config).await?;
//!
//! client.set("greeting", "hello").await?;
//! assert_eq!(client.get("greeting").await?.as_deref(), Some("hello"));
//! ```

#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod pool;
pub mod pubsub;
pub mod transport;

#[cfg(test)]
pub(crate) mod testutil;

pub use client::Client;
pub use config::ClientConfig;
pub use connection::Connection;
pub use error::{Error, Result};
pub use pool::Pool;
pub use pubsub::{PushMessage, Subscriber};
pub use transport::{Connector, TcpConnector};

// Re-export the protocol layer so callers need only one crate.
pub use kvwire_core::{Command, FromValue, Value};
