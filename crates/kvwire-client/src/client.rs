//! Typed client surface.
//!
//! [`Client`] owns one request/response connection and exposes the
//! command families of a Redis-like store: keys, strings, sets, hashes,
//! lists, and publish. Replies convert through
//! [`FromValue`](kvwire_core::FromValue); nil-capable replies come back
//! as `Option`.

use std::collections::HashMap;

use kvwire_core::{Command, FromValue, Value};

use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::error::Result;
use crate::transport::{Connector, TcpConnector};

/// Async client for a Redis-like key-value store.
pub struct Client {
    conn: Connection,
    connector: Box<dyn Connector>,
    config: ClientConfig,
}

impl Client {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Connects over TCP using [`TcpConnector`].
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        Self::connect_with(TcpConnector, config).await
    }

    /// Connects over an injected transport.
    pub async fn connect_with(
        connector: impl Connector + 'static,
        config: ClientConfig,
    ) -> Result<Self> {
        let connector: Box<dyn Connector> = Box::new(connector);
        let conn = Connection::establish(connector.as_ref(), &config).await?;
        Ok(Self {
            conn,
            connector,
            config,
        })
    }

    /// Drops the current connection and dials a fresh one with the same
    /// configuration (including AUTH/SELECT handshake).
    pub async fn reconnect(&mut self) -> Result<()> {
        tracing::info!(addr = %self.config.addr(), "reconnecting");
        self.conn = Connection::establish(self.connector.as_ref(), &self.config).await?;
        Ok(())
    }

    /// Sends `QUIT` and closes the connection.
    pub async fn quit(self) -> Result<()> {
        self.conn.quit().await
    }

    /// Switches the logical database; subsequent reconnects keep it.
    pub async fn select(&mut self, index: i64) -> Result<()> {
        self.command::<()>(Command::new("SELECT").arg(index)).await?;
        self.config.database = Some(index);
        Ok(())
    }

    /// Health probe.
    pub async fn ping(&mut self) -> Result<String> {
        self.command(Command::new("PING")).await
    }

    /// Executes an arbitrary command and returns the raw reply value.
    /// Escape hatch for commands the typed surface does not cover.
    pub async fn raw(&mut self, cmd: Command) -> Result<Value> {
        self.conn.command(&cmd).await
    }

    async fn command<T: FromValue>(&mut self, cmd: Command) -> Result<T> {
        let value = self.conn.command(&cmd).await?;
        Ok(T::from_value(value)?)
    }

    // ========================================================================
    // Keys
    // ========================================================================

    /// `EXISTS key`
    pub async fn exists(&mut self, key: &str) -> Result<bool> {
        self.command(Command::new("EXISTS").arg(key)).await
    }

    /// `EXPIRE key seconds` — `true` when a timeout was set.
    pub async fn expire(&mut self, key: &str, seconds: i64) -> Result<bool> {
        self.command(Command::new("EXPIRE").arg(key).arg(seconds))
            .await
    }

    /// `PERSIST key` — `true` when a timeout was removed.
    pub async fn persist(&mut self, key: &str) -> Result<bool> {
        self.command(Command::new("PERSIST").arg(key)).await
    }

    /// `RENAME key newkey`
    pub async fn rename(&mut self, key: &str, new_key: &str) -> Result<()> {
        self.command(Command::new("RENAME").arg(key).arg(new_key))
            .await
    }

    /// `DEL key` — number of keys removed.
    pub async fn del(&mut self, key: &str) -> Result<i64> {
        self.command(Command::new("DEL").arg(key)).await
    }

    /// `TYPE key` — `"none"`, `"string"`, `"list"`, `"set"`, `"zset"`,
    /// or `"hash"`.
    pub async fn key_type(&mut self, key: &str) -> Result<String> {
        self.command(Command::new("TYPE").arg(key)).await
    }

    // ========================================================================
    // Strings
    // ========================================================================

    /// `SET key value`
    pub async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.command(Command::new("SET").arg(key).arg(value)).await
    }

    /// `GET key`
    pub async fn get(&mut self, key: &str) -> Result<Option<String>> {
        self.command(Command::new("GET").arg(key)).await
    }

    /// `SET key value` with an integer payload.
    pub async fn set_int(&mut self, key: &str, value: i64) -> Result<()> {
        self.command(Command::new("SET").arg(key).arg(value)).await
    }

    /// `GET key` parsed as an integer.
    pub async fn get_int(&mut self, key: &str) -> Result<Option<i64>> {
        self.command(Command::new("GET").arg(key)).await
    }

    /// `APPEND key value` — length of the string afterwards.
    pub async fn append(&mut self, key: &str, value: &str) -> Result<i64> {
        self.command(Command::new("APPEND").arg(key).arg(value))
            .await
    }

    /// `MSET k1 v1 [k2 v2 ...]`
    pub async fn mset<K, V>(&mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Result<()>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let cmd = Command::new("MSET")
            .pairs(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self.command(cmd).await
    }

    /// `MGET k1 [k2 ...]` — one entry per requested key, `None` where
    /// the key is missing, preserving positional correspondence.
    pub async fn mget<K: Into<String>>(
        &mut self,
        keys: impl IntoIterator<Item = K>,
    ) -> Result<Vec<Option<String>>> {
        let cmd = Command::new("MGET").args(keys.into_iter().map(Into::into));
        self.command(cmd).await
    }

    // ========================================================================
    // Sets
    // ========================================================================

    /// `SADD key member [member ...]` — number of members added.
    pub async fn sadd<M: Into<String>>(
        &mut self,
        key: &str,
        members: impl IntoIterator<Item = M>,
    ) -> Result<i64> {
        let cmd = Command::new("SADD")
            .arg(key)
            .args(members.into_iter().map(Into::into));
        self.command(cmd).await
    }

    /// `SCARD key`
    pub async fn scard(&mut self, key: &str) -> Result<i64> {
        self.command(Command::new("SCARD").arg(key)).await
    }

    /// `SREM key member [member ...]` — number of members removed.
    pub async fn srem<M: Into<String>>(
        &mut self,
        key: &str,
        members: impl IntoIterator<Item = M>,
    ) -> Result<i64> {
        let cmd = Command::new("SREM")
            .arg(key)
            .args(members.into_iter().map(Into::into));
        self.command(cmd).await
    }

    /// `SMEMBERS key`
    pub async fn smembers(&mut self, key: &str) -> Result<Vec<String>> {
        self.command(Command::new("SMEMBERS").arg(key)).await
    }

    // ========================================================================
    // Hashes
    // ========================================================================

    /// `HSET key field value` — `true` when the field is new.
    pub async fn hset(&mut self, key: &str, field: &str, value: &str) -> Result<bool> {
        self.command(Command::new("HSET").arg(key).arg(field).arg(value))
            .await
    }

    /// `HGET key field`
    pub async fn hget(&mut self, key: &str, field: &str) -> Result<Option<String>> {
        self.command(Command::new("HGET").arg(key).arg(field)).await
    }

    /// `HINCRBY key field delta` — the field value afterwards.
    pub async fn hincrby(&mut self, key: &str, field: &str, delta: i64) -> Result<i64> {
        self.command(Command::new("HINCRBY").arg(key).arg(field).arg(delta))
            .await
    }

    /// `HMSET key f1 v1 [f2 v2 ...]`
    pub async fn hmset<F, V>(
        &mut self,
        key: &str,
        pairs: impl IntoIterator<Item = (F, V)>,
    ) -> Result<()>
    where
        F: Into<String>,
        V: Into<String>,
    {
        let cmd = Command::new("HMSET")
            .arg(key)
            .pairs(pairs.into_iter().map(|(f, v)| (f.into(), v.into())));
        self.command(cmd).await
    }

    /// `HDEL key field [field ...]` — number of fields removed.
    pub async fn hdel<F: Into<String>>(
        &mut self,
        key: &str,
        fields: impl IntoIterator<Item = F>,
    ) -> Result<i64> {
        let cmd = Command::new("HDEL")
            .arg(key)
            .args(fields.into_iter().map(Into::into));
        self.command(cmd).await
    }

    /// `HEXISTS key field`
    pub async fn hexists(&mut self, key: &str, field: &str) -> Result<bool> {
        self.command(Command::new("HEXISTS").arg(key).arg(field))
            .await
    }

    /// `HMGET key f1 [f2 ...]` — map from requested field to its value,
    /// `None` for absent fields.
    pub async fn hmget<F: Into<String>>(
        &mut self,
        key: &str,
        fields: impl IntoIterator<Item = F>,
    ) -> Result<HashMap<String, Option<String>>> {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        let cmd = Command::new("HMGET").arg(key).args(fields.clone());
        let values: Vec<Option<String>> = self.command(cmd).await?;
        Ok(fields.into_iter().zip(values).collect())
    }

    /// `HGETALL key`
    pub async fn hgetall(&mut self, key: &str) -> Result<HashMap<String, String>> {
        self.command(Command::new("HGETALL").arg(key)).await
    }

    // ========================================================================
    // Lists
    // ========================================================================

    /// `LINDEX key index`
    pub async fn lindex(&mut self, key: &str, index: i64) -> Result<Option<String>> {
        self.command(Command::new("LINDEX").arg(key).arg(index))
            .await
    }

    /// `LINSERT key BEFORE pivot value` — list length afterwards, or
    /// -1 when the pivot was not found.
    pub async fn linsert_before(
        &mut self,
        key: &str,
        pivot: &str,
        value: &str,
    ) -> Result<i64> {
        self.command(
            Command::new("LINSERT")
                .arg(key)
                .arg("BEFORE")
                .arg(pivot)
                .arg(value),
        )
        .await
    }

    /// `LINSERT key AFTER pivot value`
    pub async fn linsert_after(
        &mut self,
        key: &str,
        pivot: &str,
        value: &str,
    ) -> Result<i64> {
        self.command(
            Command::new("LINSERT")
                .arg(key)
                .arg("AFTER")
                .arg(pivot)
                .arg(value),
        )
        .await
    }

    /// `LLEN key`
    pub async fn llen(&mut self, key: &str) -> Result<i64> {
        self.command(Command::new("LLEN").arg(key)).await
    }

    /// `LPOP key`
    pub async fn lpop(&mut self, key: &str) -> Result<Option<String>> {
        self.command(Command::new("LPOP").arg(key)).await
    }

    /// `LPUSH key value [value ...]` — list length afterwards.
    pub async fn lpush<V: Into<String>>(
        &mut self,
        key: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Result<i64> {
        let cmd = Command::new("LPUSH")
            .arg(key)
            .args(values.into_iter().map(Into::into));
        self.command(cmd).await
    }

    /// `LRANGE key start stop`
    pub async fn lrange(&mut self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        self.command(Command::new("LRANGE").arg(key).arg(start).arg(stop))
            .await
    }

    /// `LREM key count value` — number of elements removed.
    pub async fn lrem(&mut self, key: &str, count: i64, value: &str) -> Result<i64> {
        self.command(Command::new("LREM").arg(key).arg(count).arg(value))
            .await
    }

    /// `LSET key index value`
    pub async fn lset(&mut self, key: &str, index: i64, value: &str) -> Result<()> {
        self.command(Command::new("LSET").arg(key).arg(index).arg(value))
            .await
    }

    /// `LTRIM key start stop`
    pub async fn ltrim(&mut self, key: &str, start: i64, stop: i64) -> Result<()> {
        self.command(Command::new("LTRIM").arg(key).arg(start).arg(stop))
            .await
    }

    /// `RPOP key`
    pub async fn rpop(&mut self, key: &str) -> Result<Option<String>> {
        self.command(Command::new("RPOP").arg(key)).await
    }

    /// `RPUSH key value [value ...]` — list length afterwards.
    pub async fn rpush<V: Into<String>>(
        &mut self,
        key: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Result<i64> {
        let cmd = Command::new("RPUSH")
            .arg(key)
            .args(values.into_iter().map(Into::into));
        self.command(cmd).await
    }

    // ========================================================================
    // Pub/Sub (publishing side; see `pubsub` for subscribing)
    // ========================================================================

    /// `PUBLISH channel message` — number of subscribers that received
    /// the message.
    pub async fn publish(&mut self, channel: &str, message: &str) -> Result<i64> {
        self.command(Command::new("PUBLISH").arg(channel).arg(message))
            .await
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("addr", &self.config.addr())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
