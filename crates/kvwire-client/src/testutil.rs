//! Shared scaffolding for in-crate tests: scripted in-memory transports.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::transport::{BoxedStream, Connector};

/// Connector that hands out successive in-memory streams, so tests can
/// script the server side of each connection (including reconnects).
pub(crate) struct ScriptedConnector {
    streams: Mutex<Vec<DuplexStream>>,
}

impl ScriptedConnector {
    /// Creates a connector holding `n` fresh streams and returns the
    /// matching server ends in connection order.
    pub(crate) fn with_streams(n: usize) -> (Self, Vec<DuplexStream>) {
        let mut clients = Vec::new();
        let mut servers = Vec::new();
        for _ in 0..n {
            let (c, s) = duplex(4096);
            clients.push(c);
            servers.push(s);
        }
        clients.reverse(); // pop() yields them in creation order
        (
            Self {
                streams: Mutex::new(clients),
            },
            servers,
        )
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, _config: &ClientConfig) -> Result<BoxedStream> {
        let stream = self
            .streams
            .lock()
            .expect("lock")
            .pop()
            .expect("no more scripted streams");
        Ok(Box::new(stream))
    }
}

/// Reads exactly the expected request bytes and answers with `reply`.
pub(crate) async fn expect_and_reply(
    server: &mut DuplexStream,
    expect: &[u8],
    reply: &[u8],
) {
    let mut got = vec![0u8; expect.len()];
    server.read_exact(&mut got).await.expect("read request");
    assert_eq!(
        String::from_utf8_lossy(&got),
        String::from_utf8_lossy(expect),
        "unexpected request bytes"
    );
    server.write_all(reply).await.expect("write reply");
}
