use tokio::sync::{mpsc, watch};

use crate::common::{LiveState, NetworkCommand, NetworkEvent, OutgoingMessage};
use crate::config::AppConfig;

use super::backoff::Backoff;
use super::http::HistoryClient;
use super::live::LiveConnection;

/// Network side of a chat session: loads the history, keeps the live
/// connection and routes outgoing messages to both the HTTP store and the
/// live feed.
pub struct ChatClient {
    event_sender: mpsc::Sender<NetworkEvent>,
    command_receiver: mpsc::Receiver<NetworkCommand>,
    history: HistoryClient,
    ws_url: String,
    backoff: Backoff,
    username: String,
}

impl ChatClient {
    pub fn new(
        event_sender: mpsc::Sender<NetworkEvent>,
        command_receiver: mpsc::Receiver<NetworkCommand>,
        config: &AppConfig,
        username: String,
    ) -> Self {
        Self {
            event_sender,
            command_receiver,
            history: HistoryClient::new(&config.http_url),
            ws_url: config.ws_url.clone(),
            backoff: Backoff::from_config(&config.reconnect),
            username,
        }
    }

    /// Runs until the command channel closes, then shuts the live
    /// connection down.
    pub async fn run(mut self) {
        let (outbound_tx, outbound_rx) = mpsc::channel(100);
        let (state_tx, state_rx) = watch::channel(LiveState::Unconnected);

        let live = LiveConnection::new(
            self.ws_url.clone(),
            self.backoff.clone(),
            outbound_rx,
            self.event_sender.clone(),
            state_tx,
        );
        let live_task = tokio::spawn(live.run());

        self.spawn_history_fetch();
        log::info!("Network event loop started as {}", self.username);

        while let Some(command) = self.command_receiver.recv().await {
            self.handle_command(command, &outbound_tx, &state_rx).await;
        }

        drop(outbound_tx);
        if let Err(err) = live_task.await {
            log::error!("Live connection task failed: {err}");
        }
        log::info!("Network event loop stopped");
    }

    fn spawn_history_fetch(&self) {
        let history = self.history.clone();
        let events = self.event_sender.clone();

        tokio::spawn(async move {
            let event = match history.fetch_history().await {
                Ok(messages) => {
                    log::info!(
                        "Loaded {} messages from {}",
                        messages.len(),
                        history.messages_url()
                    );
                    NetworkEvent::HistoryLoaded(messages)
                }
                Err(err) => {
                    log::error!("Failed to load history: {err}");
                    NetworkEvent::HistoryFailed(err.to_string())
                }
            };
            let _ = events.send(event).await;
        });
    }

    async fn handle_command(
        &self,
        command: NetworkCommand,
        outbound: &mpsc::Sender<OutgoingMessage>,
        live_state: &watch::Receiver<LiveState>,
    ) {
        match command {
            NetworkCommand::SendMessage(text) => {
                if text.is_empty() {
                    log::debug!("Ignoring empty message");
                    return;
                }

                let message = OutgoingMessage::new(text, self.username.as_str());
                self.spawn_submit(message.clone());

                let state = *live_state.borrow();
                if state.is_open() {
                    if let Err(err) = outbound.send(message).await {
                        log::warn!("Failed to queue live broadcast: {err}");
                    }
                } else {
                    log::debug!("Live connection {}; skipping broadcast", state.label());
                }
            }
        }
    }

    fn spawn_submit(&self, message: OutgoingMessage) {
        let history = self.history.clone();
        let events = self.event_sender.clone();

        tokio::spawn(async move {
            let event = match history.post_message(&message).await {
                Ok(mut stored) => {
                    // Lets the live echo of the same send be recognised.
                    if stored.client_id.is_none() {
                        stored.client_id = Some(message.client_id);
                    }
                    NetworkEvent::MessageSent(stored)
                }
                Err(err) => {
                    log::warn!("Failed to submit message: {err}");
                    NetworkEvent::SendFailed(err.to_string())
                }
            };
            let _ = events.send(event).await;
        });
    }
}
