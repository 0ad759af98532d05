use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier assigned by the message store. Servers hand out either
/// unsigned numeric ids or opaque strings, so both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    Number(u64),
    Text(String),
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::Number(n) => write!(f, "{n}"),
            MessageId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for MessageId {
    fn from(value: u64) -> Self {
        MessageId::Number(value)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        MessageId::Text(value.to_string())
    }
}

/// Domain model for one chat entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub text: String,
    pub sender: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

impl ChatMessage {
    pub fn parse_frame(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }
}

/// Payload posted over HTTP and sent as an outbound WebSocket frame.
/// The server assigns the `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    pub sender: String,
    pub timestamp: i64,
    pub client_id: String,
}

impl OutgoingMessage {
    pub fn new(text: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: sender.into(),
            timestamp: Utc::now().timestamp_millis(),
            client_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Lifecycle of the live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LiveState {
    #[default]
    Unconnected,
    Connecting,
    Open,
    Closed,
    Errored,
}

impl LiveState {
    pub fn label(self) -> &'static str {
        match self {
            LiveState::Unconnected => "unconnected",
            LiveState::Connecting => "connecting",
            LiveState::Open => "open",
            LiveState::Closed => "closed",
            LiveState::Errored => "errored",
        }
    }

    pub fn is_open(self) -> bool {
        self == LiveState::Open
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Float(f64),
    Text(String),
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawTimestamp>::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| match raw {
        RawTimestamp::Millis(ms) => Some(ms),
        RawTimestamp::Float(ms) => Some(ms as i64),
        RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.timestamp_millis())
            .ok(),
    }))
}
