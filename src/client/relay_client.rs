//! Reconnecting relay client.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::backoff::{Backoff, ConnectionState, ReconnectPolicy};
use crate::ws::messages::{ClientFrame, ServerFrame};

/// Default keep-alive period.
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(30);

/// Relay client errors.
#[derive(Debug, thiserror::Error)]
pub enum RelayClientError {
    /// Every reconnect attempt failed.
    #[error("relay unreachable after {attempts} reconnect attempts")]
    GaveUp {
        /// Reconnects attempted.
        attempts: u32,
    },
}

/// Relay client settings.
#[derive(Debug, Clone)]
pub struct RelayClientConfig {
    /// WebSocket URL, e.g. `ws://localhost:5000/ws`.
    pub url: String,
    /// Bearer token sent in the auth frame.
    pub token: String,
    /// Reconnect schedule.
    pub policy: ReconnectPolicy,
    /// Keep-alive period.
    pub ping_interval: Duration,
}

impl RelayClientConfig {
    /// Settings with the default policy and ping period.
    #[must_use]
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            policy: ReconnectPolicy::default(),
            ping_interval: DEFAULT_PING_INTERVAL,
        }
    }
}

/// How a single connection ended.
enum SessionEnd {
    /// The socket closed or failed; reconnect.
    Dropped,
    /// Shutdown requested or nobody consumes frames any more.
    Stop,
}

/// Consumes relay frames, reconnecting per [`ReconnectPolicy`].
#[derive(Debug)]
pub struct RelayClient {
    config: RelayClientConfig,
    state: watch::Sender<ConnectionState>,
}

impl RelayClient {
    /// Creates a disconnected client.
    #[must_use]
    pub fn new(config: RelayClientConfig) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self { config, state }
    }

    /// Observes connection state transitions.
    #[must_use]
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Runs until `shutdown` turns `true`, `frames` is dropped, or the
    /// reconnect budget is spent.
    ///
    /// Every server frame is delivered to `frames` in arrival order.
    ///
    /// # Errors
    ///
    /// Returns [`RelayClientError::GaveUp`] when the policy allows no more
    /// reconnects.
    pub async fn run(
        &self,
        frames: mpsc::Sender<ServerFrame>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), RelayClientError> {
        let mut backoff = Backoff::new(self.config.policy);

        loop {
            if *shutdown.borrow() {
                break;
            }
            self.set_state(ConnectionState::Connecting);

            let connected = tokio::select! {
                connected = connect_async(self.config.url.as_str()) => Some(connected),
                () = stop_requested(&mut shutdown) => None,
            };
            let end = match connected {
                None => SessionEnd::Stop,
                Some(Ok((stream, _response))) => {
                    backoff.reset();
                    self.set_state(ConnectionState::Connected);
                    tracing::info!(url = %self.config.url, "relay connected");
                    self.session(stream, &frames, &mut shutdown).await
                }
                Some(Err(e)) => {
                    tracing::warn!(url = %self.config.url, error = %e, "relay connect failed");
                    SessionEnd::Dropped
                }
            };
            self.set_state(ConnectionState::Disconnected);

            if matches!(end, SessionEnd::Stop) {
                break;
            }
            let Some(delay) = backoff.next_delay() else {
                let attempts = backoff.attempts();
                tracing::error!(attempts, "giving up on relay");
                return Err(RelayClientError::GaveUp { attempts });
            };
            tracing::info!(
                attempt = backoff.attempts(),
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "reconnecting to relay"
            );
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = stop_requested(&mut shutdown) => break,
            }
        }

        tracing::debug!("relay client stopped");
        Ok(())
    }

    async fn session<S>(
        &self,
        stream: S,
        frames: &mpsc::Sender<ServerFrame>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> SessionEnd
    where
        S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>>
            + futures_util::Sink<Message, Error = tokio_tungstenite::tungstenite::Error>
            + Unpin,
    {
        let (mut tx, mut rx) = stream.split();

        let auth = ClientFrame::Auth {
            token: self.config.token.clone(),
        };
        if send_frame(&mut tx, &auth).await.is_err() {
            return SessionEnd::Dropped;
        }

        let period = self.config.ping_interval;
        let mut ping = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ping.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ping.tick() => {
                    if send_frame(&mut tx, &ClientFrame::Ping).await.is_err() {
                        return SessionEnd::Dropped;
                    }
                }
                msg = rx.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ServerFrame>(&text) {
                            Ok(frame) => {
                                if frames.send(frame).await.is_err() {
                                    return SessionEnd::Stop;
                                }
                            }
                            Err(e) => tracing::warn!(error = %e, "unparseable relay frame"),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => return SessionEnd::Dropped,
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "relay read failed");
                        return SessionEnd::Dropped;
                    }
                    Some(Ok(_)) => {}
                },
                () = stop_requested(shutdown) => {
                    let _ = tx.send(Message::Close(None)).await;
                    return SessionEnd::Stop;
                }
            }
        }
    }

    fn set_state(&self, next: ConnectionState) {
        let prev = self.state.send_replace(next);
        if prev != next {
            tracing::debug!(from = %prev, to = %next, "relay state");
        }
    }
}

async fn send_frame<W>(tx: &mut W, frame: &ClientFrame) -> Result<(), ()>
where
    W: futures_util::Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let text = serde_json::to_string(frame).map_err(|_| ())?;
    tx.send(Message::text(text)).await.map_err(|e| {
        tracing::warn!(error = %e, "relay write failed");
    })
}

/// Resolves once `shutdown` is `true`; never resolves if the sender is gone.
async fn stop_requested(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use futures_util::StreamExt;

    use super::*;

    #[tokio::test]
    async fn gives_up_when_nothing_listens() {
        let config = RelayClientConfig {
            policy: ReconnectPolicy {
                base: Duration::from_millis(1),
                max_delay: Duration::from_millis(4),
                max_attempts: 2,
            },
            ..RelayClientConfig::new("ws://127.0.0.1:1/ws", "token")
        };
        let client = RelayClient::new(config);
        let mut states = client.state();
        let (frames, _rx) = mpsc::channel(4);
        let (_stop_tx, stop_rx) = watch::channel(false);

        let result = client.run(frames, stop_rx).await;
        assert!(matches!(result, Err(RelayClientError::GaveUp { attempts: 2 })));
        assert!(states.has_changed().unwrap_or(false));
        assert_eq!(*states.borrow_and_update(), ConnectionState::Disconnected);
    }

    /// Refuses the first handshake, accepts and then closes the second,
    /// and leaves the third pending. Each step waits for `gate`.
    async fn flaky_relay(listener: tokio::net::TcpListener, mut gate: mpsc::Receiver<()>) {
        let Ok((tcp, _)) = listener.accept().await else {
            return;
        };
        let _ = gate.recv().await;
        drop(tcp);

        let Ok((tcp, _)) = listener.accept().await else {
            return;
        };
        let _ = gate.recv().await;
        let Ok(mut ws) = tokio_tungstenite::accept_async(tcp).await else {
            return;
        };
        let _ = ws.next().await;
        let _ = gate.recv().await;
        let _ = ws.close(None).await;

        let held = listener.accept().await;
        let _ = gate.recv().await;
        drop(held);
    }

    async fn next_state(states: &mut watch::Receiver<ConnectionState>) -> ConnectionState {
        let Ok(Ok(())) = tokio::time::timeout(Duration::from_secs(5), states.changed()).await
        else {
            panic!("no state change");
        };
        *states.borrow_and_update()
    }

    #[tokio::test]
    async fn reconnects_after_drop_with_fresh_backoff() {
        use ConnectionState::{Connected, Connecting, Disconnected};

        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        let (gate, gate_rx) = mpsc::channel(1);
        let server = tokio::spawn(flaky_relay(listener, gate_rx));

        let base = Duration::from_millis(400);
        let config = RelayClientConfig {
            policy: ReconnectPolicy {
                base,
                max_delay: Duration::from_secs(10),
                max_attempts: 5,
            },
            ..RelayClientConfig::new(format!("ws://{addr}/ws"), "token")
        };
        let client = RelayClient::new(config);
        let mut states = client.state();
        let (frames, _frames_rx) = mpsc::channel(4);
        let (stop_tx, stop_rx) = watch::channel(false);
        let runner = tokio::spawn(async move { client.run(frames, stop_rx).await });

        let mut seen = vec![next_state(&mut states).await];
        let _ = gate.send(()).await;
        seen.push(next_state(&mut states).await);
        seen.push(next_state(&mut states).await);
        let _ = gate.send(()).await;
        seen.push(next_state(&mut states).await);
        let _ = gate.send(()).await;
        seen.push(next_state(&mut states).await);
        let dropped_at = tokio::time::Instant::now();
        seen.push(next_state(&mut states).await);
        let retry_delay = dropped_at.elapsed();

        assert_eq!(
            seen,
            [Connecting, Disconnected, Connecting, Connected, Disconnected, Connecting]
        );
        // One failure preceded the session; without a reset this would be 2 × base.
        assert!(retry_delay < base * 2 - Duration::from_millis(100), "{retry_delay:?}");

        let _ = stop_tx.send(true);
        let Ok(Ok(result)) = tokio::time::timeout(Duration::from_secs(5), runner).await else {
            panic!("client did not stop");
        };
        assert!(result.is_ok());
        server.abort();
    }

    #[tokio::test]
    async fn shutdown_before_start_returns_immediately() {
        let client = RelayClient::new(RelayClientConfig::new("ws://127.0.0.1:1/ws", "t"));
        let (frames, _rx) = mpsc::channel(1);
        let (_stop_tx, stop_rx) = watch::channel(true);
        assert!(client.run(frames, stop_rx).await.is_ok());
    }
}
