use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::common::{ChatMessage, LiveState, MessageId};

const MAX_ACTIVITY_EVENTS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Connection,
    History,
    Duplicate,
    Dropped,
    Failure,
}

/// One line in the activity panel.
#[derive(Debug, Clone)]
pub struct ActivityEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: ActivityKind,
    pub message: String,
}

/// Local state of one chat session.
pub struct AppState {
    /// Displayed sequence. Append-only; ids are unique.
    pub messages: Vec<ChatMessage>,
    pub input_text: String,
    pub username: String,
    pub live_state: LiveState,
    pub activity: Vec<ActivityEvent>,
    /// Set whenever `messages` changes; the chat area scrolls and clears it.
    pub scroll_to_latest: bool,
    seen_ids: HashSet<MessageId>,
    seen_client_ids: HashSet<String>,
}

impl AppState {
    pub fn new(username: String) -> Self {
        Self {
            messages: Vec::new(),
            input_text: String::new(),
            username,
            live_state: LiveState::Unconnected,
            activity: Vec::new(),
            scroll_to_latest: false,
            seen_ids: HashSet::new(),
            seen_client_ids: HashSet::new(),
        }
    }

    pub fn contains(&self, message: &ChatMessage) -> bool {
        self.seen_ids.contains(&message.id)
            || message
                .client_id
                .as_ref()
                .is_some_and(|id| self.seen_client_ids.contains(id))
    }

    /// Replaces the sequence with the fetched history.
    pub fn load_history(&mut self, history: Vec<ChatMessage>) {
        self.messages.clear();
        self.seen_ids.clear();
        self.seen_client_ids.clear();

        let count = history.len();
        for message in history {
            self.append(message);
        }
        self.scroll_to_latest = true;
        self.add_activity(
            ActivityKind::History,
            format!("Loaded {count} messages from history"),
        );
    }

    /// Appends a message from the live feed, stamped with the local time.
    /// Returns false if it was a duplicate.
    pub fn receive_live(&mut self, mut message: ChatMessage) -> bool {
        message.timestamp = Some(Utc::now().timestamp_millis());
        self.append_unique(message)
    }

    /// Appends the store's echo of our own send and clears the input.
    pub fn accept_sent(&mut self, message: ChatMessage) -> bool {
        self.input_text.clear();
        self.append_unique(message)
    }

    /// Text to submit, if the input holds any. The input is left untouched
    /// until the store confirms the send.
    pub fn pending_submission(&self) -> Option<String> {
        if self.input_text.is_empty() {
            None
        } else {
            Some(self.input_text.clone())
        }
    }

    pub fn send_failed(&mut self, reason: String) {
        self.add_activity(ActivityKind::Failure, format!("Send failed: {reason}"));
    }

    pub fn set_live_state(&mut self, state: LiveState) {
        if self.live_state == state {
            return;
        }
        self.live_state = state;
        self.add_activity(
            ActivityKind::Connection,
            format!("Live connection {}", state.label()),
        );
    }

    pub fn add_activity(&mut self, kind: ActivityKind, message: String) {
        self.activity.push(ActivityEvent {
            timestamp: Utc::now(),
            kind,
            message,
        });

        if self.activity.len() > MAX_ACTIVITY_EVENTS {
            self.activity.remove(0);
        }
    }

    fn append_unique(&mut self, message: ChatMessage) -> bool {
        if self.contains(&message) {
            log::debug!("Dropping duplicate message {}", message.id);
            self.add_activity(
                ActivityKind::Duplicate,
                format!("Duplicate message {} dropped", message.id),
            );
            return false;
        }
        self.append(message);
        self.scroll_to_latest = true;
        true
    }

    fn append(&mut self, message: ChatMessage) {
        if self.contains(&message) {
            return;
        }
        self.seen_ids.insert(message.id.clone());
        if let Some(client_id) = &message.client_id {
            self.seen_client_ids.insert(client_id.clone());
        }
        self.messages.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: u64, text: &str, sender: &str) -> ChatMessage {
        ChatMessage {
            id: id.into(),
            text: text.into(),
            sender: sender.into(),
            timestamp: Some(100),
            client_id: None,
        }
    }

    fn ids(state: &AppState) -> Vec<MessageId> {
        state.messages.iter().map(|m| m.id.clone()).collect()
    }

    #[test]
    fn history_is_displayed_as_received() {
        let mut state = AppState::new("User1".into());
        let history = vec![msg(3, "a", "x"), msg(1, "b", "y"), msg(2, "c", "z")];
        state.load_history(history.clone());
        assert_eq!(state.messages, history);
        assert!(state.scroll_to_latest);
    }

    #[test]
    fn duplicate_live_message_is_dropped() {
        let mut state = AppState::new("User1".into());
        state.load_history(vec![msg(1, "hi", "User7")]);

        assert!(!state.receive_live(msg(1, "hi again", "User7")));
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].text, "hi");

        assert!(state.receive_live(msg(2, "yo", "User9")));
        assert_eq!(ids(&state), vec![MessageId::Number(1), MessageId::Number(2)]);
        assert_eq!(state.messages[1].text, "yo");
    }

    #[test]
    fn live_message_gets_local_timestamp() {
        let mut state = AppState::new("User1".into());
        let before = Utc::now().timestamp_millis();
        state.receive_live(msg(5, "t", "s"));
        let stamped = state.messages[0].timestamp.unwrap();
        assert!(stamped >= before);
        assert_ne!(stamped, 100);
    }

    #[test]
    fn history_replaces_earlier_live_messages() {
        let mut state = AppState::new("User1".into());
        state.receive_live(msg(9, "early", "s"));
        state.receive_live(msg(1, "also in history", "s"));

        let history = vec![msg(1, "hi", "User7"), msg(2, "yo", "User9")];
        state.load_history(history.clone());
        assert_eq!(state.messages, history);

        // Ids dropped by the replace are no longer treated as seen.
        assert!(state.receive_live(msg(9, "again", "s")));
        assert_eq!(state.messages.len(), 3);
    }

    #[test]
    fn empty_input_is_not_submitted() {
        let state = AppState::new("User1".into());
        assert_eq!(state.pending_submission(), None);
        assert!(state.messages.is_empty());
    }

    #[test]
    fn whitespace_input_is_submitted_as_typed() {
        let mut state = AppState::new("User1".into());
        state.input_text = " ".into();
        assert_eq!(state.pending_submission().as_deref(), Some(" "));
    }

    #[test]
    fn live_and_sent_appends_request_scroll() {
        let mut state = AppState::new("User1".into());
        state.receive_live(msg(1, "a", "s"));
        assert!(state.scroll_to_latest);

        state.scroll_to_latest = false;
        state.accept_sent(msg(2, "b", "User1"));
        assert!(state.scroll_to_latest);

        state.scroll_to_latest = false;
        state.receive_live(msg(2, "b", "User1"));
        assert!(!state.scroll_to_latest);
    }

    #[test]
    fn input_is_kept_until_the_store_confirms() {
        let mut state = AppState::new("User1".into());
        state.input_text = "hello".into();

        assert_eq!(state.pending_submission().as_deref(), Some("hello"));
        assert_eq!(state.input_text, "hello");

        state.send_failed("connection refused".into());
        assert_eq!(state.input_text, "hello");
        assert!(state.messages.is_empty());

        assert!(state.accept_sent(msg(4, "hello", "User1")));
        assert!(state.input_text.is_empty());
        assert_eq!(state.messages.len(), 1);
    }

    #[test]
    fn live_echo_of_own_send_is_recognised_by_client_id() {
        let mut state = AppState::new("User1".into());
        let mut stored = msg(10, "hello", "User1");
        stored.client_id = Some("c-1".into());
        state.accept_sent(stored);

        let mut broadcast = msg(77, "hello", "User1");
        broadcast.client_id = Some("c-1".into());
        assert!(!state.receive_live(broadcast));
        assert_eq!(state.messages.len(), 1);
    }

    #[test]
    fn sent_echo_after_live_broadcast_is_dropped() {
        let mut state = AppState::new("User1".into());
        state.receive_live(msg(10, "hello", "User1"));
        state.input_text = "hello".into();

        assert!(!state.accept_sent(msg(10, "hello", "User1")));
        assert_eq!(state.messages.len(), 1);
        assert!(state.input_text.is_empty());
    }

    #[test]
    fn activity_log_is_bounded() {
        let mut state = AppState::new("User1".into());
        for i in 0..250 {
            state.add_activity(ActivityKind::Connection, format!("event {i}"));
        }
        assert_eq!(state.activity.len(), MAX_ACTIVITY_EVENTS);
        assert_eq!(state.activity[0].message, "event 150");
    }

    #[test]
    fn live_state_changes_are_logged_once() {
        let mut state = AppState::new("User1".into());
        state.set_live_state(LiveState::Open);
        state.set_live_state(LiveState::Open);
        assert_eq!(state.live_state, LiveState::Open);
        assert_eq!(state.activity.len(), 1);
    }
}
