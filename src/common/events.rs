use super::types::{ChatMessage, LiveState};

/// Events the network task reports back to the UI.
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    HistoryLoaded(Vec<ChatMessage>),
    HistoryFailed(String),
    /// A message broadcast over the live connection.
    MessageReceived(ChatMessage),
    /// The server's echo of a message we submitted over HTTP.
    MessageSent(ChatMessage),
    SendFailed(String),
    LiveStateChanged(LiveState),
    FrameDropped(String),
}
