//! Pub/sub subscriber.
//!
//! Subscriptions run on their own connection: once `SUBSCRIBE` is sent,
//! the server pushes frames at will and the request/response contract
//! no longer holds, so [`Subscriber`] is a separate type rather than a
//! mode of [`Client`](crate::Client).
//!
//! Two consumption styles are offered: pull one message at a time with
//! [`Subscriber::next_message`], or hand the subscriber to a background
//! task with [`Subscriber::listen`] and drain an `mpsc` receiver.

use kvwire_core::{Command, Value};
use tokio::sync::mpsc;

use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::transport::{Connector, TcpConnector};

/// One message pushed to a subscribed channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    /// Channel the message was published to.
    pub channel: String,
    /// Message payload. Binary-safe.
    pub payload: Vec<u8>,
}

impl PushMessage {
    /// Payload as UTF-8 text, when it is text.
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}

/// What the server pushed: a delivery or a subscription bookkeeping
/// frame carrying the new subscription count.
enum Frame {
    Delivery(PushMessage),
    Confirmation(usize),
}

/// Subscriber connection for pub/sub channels.
pub struct Subscriber {
    conn: Connection,
    subscriptions: usize,
}

impl Subscriber {
    /// Connects over TCP and runs the usual handshake.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        Self::connect_with(&TcpConnector, config).await
    }

    /// Connects over an injected transport.
    pub async fn connect_with(
        connector: &dyn Connector,
        config: ClientConfig,
    ) -> Result<Self> {
        let conn = Connection::establish(connector, &config).await?;
        Ok(Self {
            conn,
            subscriptions: 0,
        })
    }

    /// Subscribes to the given channels, waiting for the server's
    /// confirmation of each.
    pub async fn subscribe<C: Into<String>>(
        &mut self,
        channels: impl IntoIterator<Item = C>,
    ) -> Result<()> {
        let channels: Vec<String> = channels.into_iter().map(Into::into).collect();
        let expected = channels.len();
        self.conn
            .send(&Command::new("SUBSCRIBE").args(channels))
            .await?;
        self.await_confirmations(expected).await
    }

    /// Unsubscribes from one channel. Messages that arrive while the
    /// confirmation is in flight are discarded.
    pub async fn unsubscribe(&mut self, channel: &str) -> Result<()> {
        self.conn
            .send(&Command::new("UNSUBSCRIBE").arg(channel))
            .await?;
        self.await_confirmations(1).await
    }

    /// Number of channels currently subscribed, as last reported by the
    /// server.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions
    }

    /// `true` while at least one subscription is active.
    pub fn is_subscribed(&self) -> bool {
        self.subscriptions > 0
    }

    /// Waits for the next pushed message, skipping subscription
    /// bookkeeping frames. Errors with [`Error::NotSubscribed`] when no
    /// subscription is active, and with [`Error::SubscriptionClosed`]
    /// when the server closes the connection while one is.
    pub async fn next_message(&mut self) -> Result<PushMessage> {
        if !self.is_subscribed() {
            return Err(Error::NotSubscribed);
        }
        loop {
            let frame = match self.read_frame().await {
                Err(Error::ConnectionClosed) => return Err(Error::SubscriptionClosed),
                other => other?,
            };
            match frame {
                Frame::Delivery(message) => return Ok(message),
                Frame::Confirmation(count) => {
                    self.subscriptions = count;
                    if count == 0 {
                        return Err(Error::NotSubscribed);
                    }
                }
            }
        }
    }

    /// Moves the subscriber onto a background task and returns a
    /// receiver of pushed messages. The task ends when the subscription
    /// count drops to zero, the connection closes, or the receiver is
    /// dropped.
    pub fn listen(mut self) -> mpsc::Receiver<PushMessage> {
        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            loop {
                let message = match self.next_message().await {
                    Ok(message) => message,
                    Err(Error::NotSubscribed) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, "subscription stream ended");
                        break;
                    }
                };
                if tx.send(message).await.is_err() {
                    break;
                }
            }
        });
        rx
    }

    async fn await_confirmations(&mut self, mut remaining: usize) -> Result<()> {
        while remaining > 0 {
            if let Frame::Confirmation(count) = self.read_frame().await? {
                self.subscriptions = count;
                remaining -= 1;
            }
        }
        Ok(())
    }

    /// Decodes one pushed frame: `["message", channel, payload]` or
    /// `["subscribe"|"unsubscribe", channel, count]`.
    async fn read_frame(&mut self) -> Result<Frame> {
        loop {
            let items = match self.conn.read_value().await? {
                Value::Array(items) => items,
                // Keepalives or unexpected scalars; ignore.
                _ => continue,
            };
            let mut iter = items.into_iter();
            let kind = iter.next().and_then(|v| v.as_str().map(str::to_owned));
            match kind.as_deref() {
                Some("message") => {
                    let channel = iter
                        .next()
                        .and_then(|v| v.as_str().map(str::to_owned))
                        .unwrap_or_default();
                    let payload = match iter.next() {
                        Some(Value::Bulk(b)) => b,
                        Some(Value::Simple(s)) => s.into_bytes(),
                        _ => Vec::new(),
                    };
                    return Ok(Frame::Delivery(PushMessage { channel, payload }));
                }
                Some("subscribe") | Some("unsubscribe") => {
                    let count = iter
                        .nth(1)
                        .and_then(|v| v.as_integer())
                        .unwrap_or_default()
                        .max(0) as usize;
                    return Ok(Frame::Confirmation(count));
                }
                _ => continue,
            }
        }
    }
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("subscriptions", &self.subscriptions)
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
    use tokio::io::{AsyncWriteExt, DuplexStream};

    fn scripted_pair() -> (ScriptedConnector, DuplexStream) {
        let (connector, mut servers) = ScriptedConnector::with_streams(1);
        (connector, servers.remove(0))
    }

    fn message_frame(channel: &str, payload: &str) -> Vec<u8> {
        format!(
            "*3\r\n$7\r\nmessage\r\n${}\r\n{}\r\n${}\r\n{}\r\n",
            channel.len(),
            channel,
            payload.len(),
            payload
        )
        .into_bytes()
    }

    fn subscribe_frame(channel: &str, count: i64) -> Vec<u8> {
        format!(
            "*3\r\n$9\r\nsubscribe\r\n${}\r\n{}\r\n:{}\r\n",
            channel.len(),
            channel,
            count
        )
        .into_bytes()
    }

    fn unsubscribe_frame(channel: &str, count: i64) -> Vec<u8> {
        format!(
            "*3\r\n$11\r\nunsubscribe\r\n${}\r\n{}\r\n:{}\r\n",
            channel.len(),
            channel,
            count
        )
        .into_bytes()
    }

    async fn subscribed_pair(channel: &str) -> (Subscriber, DuplexStream) {
        let (connector, mut server) = scripted_pair();
        let channel_owned = channel.to_string();
        let task = tokio::spawn(async move {
            let mut sub = Subscriber::connect_with(&connector, ClientConfig::default())
                .await
                .expect("connect");
            sub.subscribe([channel_owned]).await.expect("subscribe");
            sub
        });
        expect_and_reply(
            &mut server,
            format!(
                "*2\r\n$9\r\nSUBSCRIBE\r\n${}\r\n{}\r\n",
                channel.len(),
                channel
            )
            .as_bytes(),
            &subscribe_frame(channel, 1),
        )
        .await;
        (task.await.expect("join"), server)
    }

    #[tokio::test]
    async fn test_subscribe_tracks_count() {
        let (sub, _server) = subscribed_pair("news").await;
        assert!(sub.is_subscribed());
        assert_eq!(sub.subscription_count(), 1);
    }

    #[tokio::test]
    async fn test_next_message_delivers_payload() {
        let (mut sub, mut server) = subscribed_pair("news").await;
        let task = tokio::spawn(async move { sub.next_message().await.expect("message") });

        server
            .write_all(&message_frame("news", "breaking"))
            .await
            .expect("push");
        let message = task.await.expect("join");
        assert_eq!(message.channel, "news");
        assert_eq!(message.payload_str(), Some("breaking"));
    }

    #[tokio::test]
    async fn test_next_message_without_subscription() {
        let (connector, _server) = scripted_pair();
        let mut sub = Subscriber::connect_with(&connector, ClientConfig::default())
            .await
            .expect("connect");
        let got = sub.next_message().await;
        assert!(matches!(got, Err(Error::NotSubscribed)));
    }

    #[tokio::test]
    async fn test_server_close_ends_subscription() {
        let (mut sub, server) = subscribed_pair("news").await;
        drop(server);
        let got = sub.next_message().await;
        assert!(matches!(got, Err(Error::SubscriptionClosed)));
    }

    #[tokio::test]
    async fn test_unsubscribe_drops_to_zero() {
        let (mut sub, mut server) = subscribed_pair("news").await;
        let task = tokio::spawn(async move {
            sub.unsubscribe("news").await.expect("unsubscribe");
            sub
        });

        expect_and_reply(
            &mut server,
            b"*2\r\n$11\r\nUNSUBSCRIBE\r\n$4\r\nnews\r\n",
            &unsubscribe_frame("news", 0),
        )
        .await;
        let sub = task.await.expect("join");
        assert!(!sub.is_subscribed());
    }

    #[tokio::test]
    async fn test_listen_feeds_channel_until_closed() {
        let (sub, mut server) = subscribed_pair("events").await;
        let mut rx = sub.listen();

        server
            .write_all(&message_frame("events", "one"))
            .await
            .expect("push");
        server
            .write_all(&message_frame("events", "two"))
            .await
            .expect("push");

        let first = rx.recv().await.expect("first");
        assert_eq!(first.payload_str(), Some("one"));
        let second = rx.recv().await.expect("second");
        assert_eq!(second.payload_str(), Some("two"));

        // Server closing the stream ends the background task.
        drop(server);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_interleaved_confirmation_is_skipped() {
        let (mut sub, mut server) = subscribed_pair("a").await;
        let task = tokio::spawn(async move {
            sub.subscribe(["b"]).await.expect("subscribe b");
            let message = sub.next_message().await.expect("message");
            (sub.subscription_count(), message)
        });

        expect_and_reply(
            &mut server,
            b"*2\r\n$9\r\nSUBSCRIBE\r\n$1\r\nb\r\n",
            &subscribe_frame("b", 2),
        )
        .await;
        server
            .write_all(&message_frame("b", "hello"))
            .await
            .expect("push");

        let (count, message) = task.await.expect("join");
        assert_eq!(count, 2);
        assert_eq!(message.channel, "b");
    }
}
