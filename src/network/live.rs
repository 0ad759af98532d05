use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::common::{ChatMessage, LiveState, NetworkEvent, OutgoingMessage};

use super::backoff::Backoff;
use super::error::NetworkError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

enum SessionEnd {
    /// The outbound channel closed: the chat session is over.
    Shutdown,
    Lost(LiveState),
}

/// Owns the single WebSocket connection of a chat session.
///
/// The connection lives until the outbound sender is dropped; at that point
/// a close frame is sent and `run` returns. Lost connections are retried
/// according to the [`Backoff`] policy.
pub struct LiveConnection {
    url: String,
    backoff: Backoff,
    outbound: mpsc::Receiver<OutgoingMessage>,
    event_sender: mpsc::Sender<NetworkEvent>,
    state: watch::Sender<LiveState>,
}

impl LiveConnection {
    pub fn new(
        url: impl Into<String>,
        backoff: Backoff,
        outbound: mpsc::Receiver<OutgoingMessage>,
        event_sender: mpsc::Sender<NetworkEvent>,
        state: watch::Sender<LiveState>,
    ) -> Self {
        Self {
            url: url.into(),
            backoff,
            outbound,
            event_sender,
            state,
        }
    }

    pub async fn run(mut self) {
        let mut attempt: u32 = 0;

        loop {
            self.set_state(LiveState::Connecting).await;

            let lost = match connect_async(self.url.as_str()).await {
                Ok((stream, _)) => {
                    log::info!("Live connection open: {}", self.url);
                    attempt = 0;
                    self.set_state(LiveState::Open).await;
                    match self.pump(stream).await {
                        SessionEnd::Shutdown => {
                            self.set_state(LiveState::Closed).await;
                            return;
                        }
                        SessionEnd::Lost(state) => state,
                    }
                }
                Err(err) => {
                    log::warn!("Live connection to {} failed: {err}", self.url);
                    LiveState::Errored
                }
            };
            self.set_state(lost).await;

            attempt += 1;
            if !self.backoff.should_retry(attempt) {
                log::info!("Live connection {}; not reconnecting", lost.label());
                return;
            }

            let delay = self.backoff.delay(attempt);
            log::info!("Reconnecting to {} in {delay:?} (attempt {attempt})", self.url);
            if !self.wait(delay).await {
                return;
            }
        }
    }

    async fn pump(&mut self, stream: WsStream) -> SessionEnd {
        let (mut sink, mut stream) = stream.split();

        loop {
            tokio::select! {
                outgoing = self.outbound.recv() => match outgoing {
                    Some(message) => {
                        let encoded = serde_json::to_string(&message).map_err(NetworkError::Serialize);
                        let sent = match encoded {
                            Ok(json) => sink.send(Message::Text(json.into())).await.map_err(NetworkError::from),
                            Err(err) => Err(err),
                        };
                        if let Err(err) = sent {
                            log::warn!("Failed to broadcast message: {err}");
                        }
                    }
                    None => {
                        if let Err(err) = sink.close().await {
                            log::debug!("Close handshake failed: {err}");
                        }
                        log::info!("Live connection closed");
                        return SessionEnd::Shutdown;
                    }
                },
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => self.handle_frame(text.as_str()).await,
                    Some(Ok(Message::Close(frame))) => {
                        log::info!("Live connection closed by server: {frame:?}");
                        return SessionEnd::Lost(LiveState::Closed);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        log::warn!("Live connection error: {err}");
                        return SessionEnd::Lost(LiveState::Errored);
                    }
                    None => {
                        log::info!("Live connection ended");
                        return SessionEnd::Lost(LiveState::Closed);
                    }
                },
            }
        }
    }

    async fn handle_frame(&self, text: &str) {
        match ChatMessage::parse_frame(text).map_err(NetworkError::MalformedFrame) {
            Ok(message) => {
                log::debug!("Live message {} from {}", message.id, message.sender);
                let _ = self
                    .event_sender
                    .send(NetworkEvent::MessageReceived(message))
                    .await;
            }
            Err(err) => {
                log::warn!("Dropping live frame: {err}");
                let _ = self
                    .event_sender
                    .send(NetworkEvent::FrameDropped(err.to_string()))
                    .await;
            }
        }
    }

    /// Sleeps out a reconnect delay. Returns false if the session ended.
    async fn wait(&mut self, delay: Duration) -> bool {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return true,
                outgoing = self.outbound.recv() => match outgoing {
                    Some(_) => log::debug!("Live connection down; skipping broadcast"),
                    None => {
                        self.set_state(LiveState::Closed).await;
                        return false;
                    }
                },
            }
        }
    }

    async fn set_state(&self, state: LiveState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            let _ = self
                .event_sender
                .send(NetworkEvent::LiveStateChanged(state))
                .await;
        }
    }
}
