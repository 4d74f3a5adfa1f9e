//! Idle-connection recycling.
//!
//! Workloads that issue commands from many tasks reuse connections
//! instead of dialing per command: [`Pool::get`] hands out an idle
//! connection when one is healthy, otherwise dials a fresh one, and
//! [`Pool::put`] returns connections up to the configured bound.

use std::sync::Arc;

use kvwire_core::Command;
use tokio::sync::Mutex;

use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::error::Result;
use crate::transport::{Connector, TcpConnector};

/// Pool of idle connections sharing one configuration.
pub struct Pool {
    connector: Arc<dyn Connector>,
    config: ClientConfig,
    idle: Mutex<Vec<Connection>>,
}

impl Pool {
    /// Creates a TCP-backed pool.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_connector(TcpConnector, config)
    }

    /// Creates a pool over an injected transport.
    pub fn with_connector(connector: impl Connector + 'static, config: ClientConfig) -> Self {
        Self {
            connector: Arc::new(connector),
            config,
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Checks out a connection: a probed idle one when available,
    /// otherwise a freshly dialed one. Idle connections that fail the
    /// `PING` probe are discarded.
    pub async fn get(&self) -> Result<Connection> {
        loop {
            let idle = { self.idle.lock().await.pop() };
            let Some(mut conn) = idle else { break };
            match conn.command(&Command::new("PING")).await {
                Ok(_) => return Ok(conn),
                Err(e) => {
                    tracing::debug!(error = %e, "discarding dead idle connection");
                }
            }
        }
        Connection::establish(self.connector.as_ref(), &self.config).await
    }

    /// Returns a connection to the pool, dropping it when the pool
    /// already holds `max_idle` connections.
    pub async fn put(&self, conn: Connection) {
        let mut idle = self.idle.lock().await;
        if idle.len() < self.config.max_idle {
            idle.push(conn);
        }
    }

    /// Number of idle connections currently held.
    pub async fn idle_count(&self) -> usize {
        self.idle.lock().await.len()
    }
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("addr", &self.config.addr())
            .field("max_idle", &self.config.max_idle)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{ScriptedConnector, expect_and_reply};
    use kvwire_core::Value;

    #[tokio::test]
    async fn test_get_dials_when_empty() {
        let (connector, mut servers) = ScriptedConnector::with_streams(1);
        let mut server = servers.remove(0);
        let pool = Pool::with_connector(connector, ClientConfig::default());

        let task = tokio::spawn(async move {
            let mut conn = pool.get().await.expect("get");
            conn.command(&Command::new("PING")).await.expect("ping")
        });

        expect_and_reply(&mut server, b"*1\r\n$4\r\nPING\r\n", b"+PONG\r\n").await;
        assert_eq!(task.await.expect("join"), Value::Simple("PONG".into()));
    }

    #[tokio::test]
    async fn test_healthy_idle_connection_is_reused() {
        // Only one scripted stream exists: reuse is proven by the
        // second get() not asking the connector for another.
        let (connector, mut servers) = ScriptedConnector::with_streams(1);
        let mut server = servers.remove(0);
        let pool = Arc::new(Pool::with_connector(connector, ClientConfig::default()));

        let pool2 = Arc::clone(&pool);
        let task = tokio::spawn(async move {
            let conn = pool2.get().await.expect("first get");
            pool2.put(conn).await;
            assert_eq!(pool2.idle_count().await, 1);
            let mut conn = pool2.get().await.expect("second get");
            conn.command(&Command::new("GET").arg("k")).await.expect("get k")
        });

        // Health probe on checkout, then the real command.
        expect_and_reply(&mut server, b"*1\r\n$4\r\nPING\r\n", b"+PONG\r\n").await;
        expect_and_reply(&mut server, b"*2\r\n$3\r\nGET\r\n$1\r\nk\r\n", b"$1\r\nv\r\n")
            .await;
        assert_eq!(task.await.expect("join"), Value::Bulk(b"v".to_vec()));
    }

    #[tokio::test]
    async fn test_dead_idle_connection_is_replaced() {
        let (connector, mut servers) = ScriptedConnector::with_streams(2);
        let mut server_b = servers.pop().expect("second");
        let server_a = servers.pop().expect("first");
        let pool = Pool::with_connector(connector, ClientConfig::default());

        let conn = pool.get().await.expect("dial");
        pool.put(conn).await;
        // Kill the first connection while it sits idle.
        drop(server_a);

        let task = tokio::spawn(async move {
            let mut conn = pool.get().await.expect("get replacement");
            conn.command(&Command::new("PING")).await.expect("ping")
        });

        // The probe on the dead connection fails; only the replacement
        // connection ever sees traffic.
        expect_and_reply(&mut server_b, b"*1\r\n$4\r\nPING\r\n", b"+PONG\r\n").await;
        assert_eq!(task.await.expect("join"), Value::Simple("PONG".into()));
    }

    #[tokio::test]
    async fn test_put_respects_max_idle() {
        let (connector, mut servers) = ScriptedConnector::with_streams(2);
        let _server_b = servers.pop().expect("second");
        let _server_a = servers.pop().expect("first");
        let mut config = ClientConfig::default();
        config.max_idle = 1;
        let pool = Pool::with_connector(connector, config);

        let conn_a = pool.get().await.expect("a");
        let conn_b = pool.get().await.expect("b");
        pool.put(conn_a).await;
        pool.put(conn_b).await;
        assert_eq!(pool.idle_count().await, 1);
    }
}
