//! A single framed connection: write one command, read one reply.
//!
//! [`Connection`] owns the transport stream and a read buffer, feeding
//! bytes into the kvwire-core decoder until a full frame is available.
//! It also runs the connect handshake: `AUTH` when a password is
//! configured, then `SELECT` when a database index is configured.

use kvwire_core::{Command, Value, codec};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::transport::{BoxedStream, Connector};

const READ_CHUNK: usize = 4096;

/// One established connection to the server.
pub struct Connection {
    stream: BoxedStream,
    buf: Vec<u8>,
    response_timeout: std::time::Duration,
}

impl Connection {
    /// Dials the transport and runs the handshake.
    pub async fn establish(
        connector: &dyn Connector,
        config: &ClientConfig,
    ) -> Result<Self> {
        let stream = connector.connect(config).await?;
        let mut conn = Self {
            stream,
            buf: Vec::new(),
            response_timeout: config.response_timeout(),
        };
        conn.handshake(config).await?;
        tracing::debug!(addr = %config.addr(), "connection established");
        Ok(conn)
    }

    async fn handshake(&mut self, config: &ClientConfig) -> Result<()> {
        if let Some(password) = config.effective_password() {
            match self.command(&Command::new("AUTH").arg(password)).await {
                Ok(_) => {}
                Err(Error::Server(msg)) => return Err(Error::Auth(msg)),
                Err(e) => return Err(e),
            }
        }
        if let Some(index) = config.database {
            self.command(&Command::new("SELECT").arg(index)).await?;
        }
        Ok(())
    }

    /// Sends one command and reads one reply, bounded by the response
    /// timeout. Server `-ERR` replies surface as [`Error::Server`].
    pub async fn command(&mut self, cmd: &Command) -> Result<Value> {
        self.send(cmd).await?;
        let value = tokio::time::timeout(self.response_timeout, self.read_value())
            .await
            .map_err(|_| Error::ResponseTimeout(self.response_timeout))??;
        match value {
            Value::Error(msg) => Err(Error::Server(msg)),
            other => Ok(other),
        }
    }

    /// Writes a command without waiting for a reply. Subscriber mode
    /// reads its frames separately.
    pub(crate) async fn send(&mut self, cmd: &Command) -> Result<()> {
        let wire = cmd.encode()?;
        self.stream.write_all(&wire).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Reads the next reply frame, without a timeout. Used directly by
    /// the subscriber, which may legitimately wait forever.
    pub(crate) async fn read_value(&mut self) -> Result<Value> {
        loop {
            let decoded = match codec::decode(&self.buf) {
                Ok(decoded) => decoded,
                Err(e) => {
                    // Framing is lost; the buffered bytes cannot be
                    // resynchronized.
                    self.buf.clear();
                    return Err(e.into());
                }
            };
            if let Some((value, used)) = decoded {
                self.buf.drain(..used);
                return Ok(value);
            }
            let mut chunk = [0u8; READ_CHUNK];
            let n = self.stream.read(&mut chunk).await?;
            if n == 0 {
                return Err(Error::ConnectionClosed);
            }
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }

    /// Sends `QUIT` and drops the connection.
    pub async fn quit(mut self) -> Result<()> {
        // Best effort: the server may close before replying.
        self.send(&Command::new("QUIT")).await?;
        match self.read_value().await {
            Ok(_) | Err(Error::ConnectionClosed) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("buffered", &self.buf.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
