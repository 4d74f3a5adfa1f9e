//! Transport abstraction.
//!
//! The client never names a socket type: it talks to a boxed
//! [`Stream`], and obtains one through a [`Connector`]. This is the
//! dependency-injection seam — production code uses [`TcpConnector`],
//! tests hand the client one end of `tokio::io::duplex`, and embedders
//! can wrap whatever byte pipe their host provides.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// Byte stream a connection runs over.
pub trait Stream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Stream for T {}

/// Boxed transport stream.
pub type BoxedStream = Box<dyn Stream>;

/// Dials a transport for a [`ClientConfig`].
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establishes a fresh byte stream to the configured server.
    async fn connect(&self, config: &ClientConfig) -> Result<BoxedStream>;
}

/// Default TCP transport with connect timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, config: &ClientConfig) -> Result<BoxedStream> {
        let addr = config.addr();
        tracing::debug!(addr = %addr, "dialing");
        let stream = tokio::time::timeout(
            config.connect_timeout(),
            TcpStream::connect(&addr),
        )
        .await
        .map_err(|_| Error::ConnectTimeout(config.connect_timeout()))??;
        stream.set_nodelay(true)?;
        Ok(Box::new(stream))
    }
}

// ============================================================================
// Tests
// ============================================================================
