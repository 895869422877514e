//! TCP relay client exchanging newline-delimited JSON envelopes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mirrorbrain_core::{types::MeshEnvelope, Error, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

/// Returned by a round-trip that hit its timeout. The real reply, if it
/// ever arrives, is surfaced only through [`MeshClient::subscribe`].
pub const PENDING_REPLY_PLACEHOLDER: &str =
    "The remote peer is still thinking. I'll pass its reply along when it arrives.";

const INCOMING_CHANNEL_CAPACITY: usize = 64;

/// Client for a mesh relay.
///
/// Holds one persistent connection. Incoming envelopes fan out over a
/// broadcast channel, so a round-trip await and the host's out-of-band
/// listener both see every message. Delivery is best-effort: sends fail
/// fast when disconnected and round-trips are bounded by a fixed timeout,
/// with no retry and no queuing.
pub struct MeshClient {
    relay_addr: String,
    peer_id: String,
    reply_timeout: Duration,
    connected: Arc<AtomicBool>,
    writer: Mutex<Option<OwnedWriteHalf>>,
    incoming: broadcast::Sender<MeshEnvelope>,
}

impl MeshClient {
    pub fn new(
        relay_addr: impl Into<String>,
        peer_id: impl Into<String>,
        reply_timeout: Duration,
    ) -> Self {
        let (incoming, _) = broadcast::channel(INCOMING_CHANNEL_CAPACITY);
        Self {
            relay_addr: relay_addr.into(),
            peer_id: peer_id.into(),
            reply_timeout,
            connected: Arc::new(AtomicBool::new(false)),
            writer: Mutex::new(None),
            incoming,
        }
    }

    /// Whether the relay connection is currently up.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Connect to the relay. Idempotent: an already-connected client
    /// returns `true` without touching the socket.
    pub async fn connect(&self) -> bool {
        let mut writer = self.writer.lock().await;
        if self.connected.load(Ordering::SeqCst) {
            return true;
        }

        let stream = match TcpStream::connect(&self.relay_addr).await {
            Ok(stream) => stream,
            Err(err) => {
                warn!(addr = %self.relay_addr, error = %err, "relay connect failed");
                return false;
            }
        };

        let (read_half, write_half) = stream.into_split();
        *writer = Some(write_half);
        self.connected.store(true, Ordering::SeqCst);
        info!(addr = %self.relay_addr, peer = %self.peer_id, "connected to relay");

        let connected = self.connected.clone();
        let incoming = self.incoming.clone();
        tokio::spawn(async move {
            let mut reader = BufReader::new(read_half);
            let mut line = String::new();
            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(err) => {
                        warn!(error = %err, "relay read failed");
                        break;
                    }
                }
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match serde_json::from_str::<MeshEnvelope>(trimmed) {
                    Ok(envelope) => {
                        // No receivers is fine; nobody is awaiting.
                        let _ = incoming.send(envelope);
                    }
                    Err(err) => warn!(error = %err, "relay sent bad json"),
                }
            }
            connected.store(false, Ordering::SeqCst);
            info!("relay connection closed");
        });

        true
    }

    /// Send a chat envelope to a peer.
    ///
    /// Fails fast with `false` when disconnected; the caller must not
    /// assume queuing.
    pub async fn send_chat(&self, to: &str, content: &str) -> bool {
        let envelope = MeshEnvelope::chat(&self.peer_id, to, content);
        self.send_envelope(&envelope).await.is_ok()
    }

    /// Relay an utterance to a peer and await the correlated reply.
    ///
    /// Best-effort, not exactly-once: the reply is matched by sender (and
    /// by correlation id when the peer echoes one) raced against the
    /// configured timeout. On timeout the round-trip resolves to
    /// [`PENDING_REPLY_PLACEHOLDER`] and the late reply, if any, reaches
    /// the host only through [`subscribe`](Self::subscribe).
    pub async fn request_reply(&self, to: &str, content: &str) -> Result<String> {
        if !self.is_connected() && !self.connect().await {
            return Err(Error::MeshNotConnected);
        }

        // Subscribe before sending so a fast reply cannot slip past.
        let mut rx = self.incoming.subscribe();
        let envelope = MeshEnvelope::chat(&self.peer_id, to, content);
        let correlation_id = envelope.correlation_id.clone();
        self.send_envelope(&envelope).await?;

        let reply = tokio::time::timeout(self.reply_timeout, async {
            loop {
                match rx.recv().await {
                    Ok(env) if env.is_chat_from(to) => {
                        // A peer that does not echo correlation ids is still
                        // matched by sender identity.
                        if env.correlation_id.is_none() || env.correlation_id == correlation_id {
                            return Some(env.content);
                        }
                        debug!("skipping reply for a different request");
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "reply listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .await;

        match reply {
            Ok(Some(content)) => Ok(content),
            // Connection died mid-await or the clock ran out; either way
            // the caller gets the placeholder, not an error.
            Ok(None) | Err(_) => Ok(PENDING_REPLY_PLACEHOLDER.to_string()),
        }
    }

    /// Subscribe to every envelope the relay delivers.
    pub fn subscribe(&self) -> broadcast::Receiver<MeshEnvelope> {
        self.incoming.subscribe()
    }

    async fn send_envelope(&self, envelope: &MeshEnvelope) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::MeshNotConnected);
        }

        let mut writer = self.writer.lock().await;
        let Some(write_half) = writer.as_mut() else {
            return Err(Error::MeshNotConnected);
        };

        let mut frame = serde_json::to_string(envelope)?;
        frame.push('\n');
        if let Err(err) = write_half.write_all(frame.as_bytes()).await {
            warn!(error = %err, "relay write failed");
            self.connected.store(false, Ordering::SeqCst);
            *writer = None;
            return Err(Error::mesh_send(err.to_string()));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    /// Relay stub: accepts one connection and answers each chat line with
    /// the given closure, or stays silent when it returns `None`.
    async fn spawn_relay(
        reply: impl Fn(&MeshEnvelope) -> Option<MeshEnvelope> + Send + 'static,
    ) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read_half, mut write_half) = stream.into_split();
            let mut reader = BufReader::new(read_half);
            let mut line = String::new();
            loop {
                line.clear();
                if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                    break;
                }
                let envelope: MeshEnvelope = serde_json::from_str(line.trim()).unwrap();
                if let Some(out) = reply(&envelope) {
                    let mut frame = serde_json::to_string(&out).unwrap();
                    frame.push('\n');
                    write_half.write_all(frame.as_bytes()).await.unwrap();
                }
            }
        });
        addr
    }

    fn client(addr: &str, timeout_ms: u64) -> MeshClient {
        MeshClient::new(addr, "device", Duration::from_millis(timeout_ms))
    }

    #[tokio::test]
    async fn send_chat_before_connect_fails_fast() {
        let client = client("127.0.0.1:9", 100);
        assert!(!client.send_chat("brain", "hello").await);
    }

    #[tokio::test]
    async fn connect_is_idempotent() {
        let addr = spawn_relay(|_| None).await;
        let client = client(&addr, 100);
        assert!(client.connect().await);
        assert!(client.connect().await);
        assert!(client.is_connected());
    }

    #[tokio::test]
    async fn connect_to_dead_relay_returns_false() {
        // Bind then drop to get an address nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let client = client(&addr, 100);
        assert!(!client.connect().await);
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn request_reply_returns_correlated_reply() {
        let addr = spawn_relay(|env| Some(env.reply(format!("echo: {}", env.content)))).await;
        let client = client(&addr, 2_000);
        assert!(client.connect().await);

        let reply = client.request_reply("brain", "ping").await.unwrap();
        assert_eq!(reply, "echo: ping");
    }

    #[tokio::test]
    async fn request_reply_accepts_reply_without_correlation_id() {
        let addr = spawn_relay(|env| {
            let mut reply = env.reply("bare reply");
            reply.correlation_id = None;
            Some(reply)
        })
        .await;
        let client = client(&addr, 2_000);
        assert!(client.connect().await);

        let reply = client.request_reply("brain", "ping").await.unwrap();
        assert_eq!(reply, "bare reply");
    }

    #[tokio::test]
    async fn request_reply_times_out_to_placeholder() {
        let addr = spawn_relay(|_| None).await;
        let client = client(&addr, 100);
        assert!(client.connect().await);

        let reply = client.request_reply("brain", "ping").await.unwrap();
        assert_eq!(reply, PENDING_REPLY_PLACEHOLDER);
    }

    #[tokio::test]
    async fn late_reply_reaches_the_subscription() {
        // Relay replies only after the round-trip window has closed.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read_half, mut write_half) = stream.into_split();
            let mut reader = BufReader::new(read_half);
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            let envelope: MeshEnvelope = serde_json::from_str(line.trim()).unwrap();
            tokio::time::sleep(Duration::from_millis(300)).await;
            let mut frame = serde_json::to_string(&envelope.reply("late")).unwrap();
            frame.push('\n');
            write_half.write_all(frame.as_bytes()).await.unwrap();
        });

        let client = client(&addr, 50);
        assert!(client.connect().await);
        let mut rx = client.subscribe();

        let reply = client.request_reply("brain", "ping").await.unwrap();
        assert_eq!(reply, PENDING_REPLY_PLACEHOLDER);

        let late = rx.recv().await.unwrap();
        assert!(late.is_chat_from("brain"));
        assert_eq!(late.content, "late");
    }
}
