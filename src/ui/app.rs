use eframe::egui;
use tokio::sync::mpsc;

use crate::common::{NetworkCommand, NetworkEvent};

use super::components::{activity_panel, chat_area, input_bar, status_bar};
use super::state::{ActivityKind, AppState};

/// The chat window. Dropping it closes the command channel, which ends the
/// network task and with it the live connection.
pub struct ChatApp {
    state: AppState,
    command_sender: mpsc::Sender<NetworkCommand>,
    event_receiver: mpsc::Receiver<NetworkEvent>,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        username: String,
        command_sender: mpsc::Sender<NetworkCommand>,
        event_receiver: mpsc::Receiver<NetworkEvent>,
    ) -> Self {
        Self {
            state: AppState::new(username),
            command_sender,
            event_receiver,
        }
    }

    fn handle_network_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            apply_event(&mut self.state, event);
        }
    }

    fn submit(&mut self) {
        let Some(text) = self.state.pending_submission() else {
            return;
        };
        if let Err(err) = self
            .command_sender
            .try_send(NetworkCommand::SendMessage(text))
        {
            log::warn!("Failed to send command to network: {err}");
        }
    }
}

fn apply_event(state: &mut AppState, event: NetworkEvent) {
    match event {
        NetworkEvent::HistoryLoaded(history) => state.load_history(history),
        NetworkEvent::HistoryFailed(reason) => state.add_activity(
            ActivityKind::Failure,
            format!("History unavailable: {reason}"),
        ),
        NetworkEvent::MessageReceived(message) => {
            state.receive_live(message);
        }
        NetworkEvent::MessageSent(message) => {
            state.accept_sent(message);
        }
        NetworkEvent::SendFailed(reason) => state.send_failed(reason),
        NetworkEvent::LiveStateChanged(live_state) => state.set_live_state(live_state),
        NetworkEvent::FrameDropped(reason) => {
            state.add_activity(ActivityKind::Dropped, format!("Frame dropped: {reason}"))
        }
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_network_events();

        egui::TopBottomPanel::top("status_bar").show(ctx, |ui| {
            status_bar::render(ui, &self.state);
        });

        egui::SidePanel::right("activity_panel")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                activity_panel::render(ui, &self.state);
            });

        let mut send = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Chat");
            ui.separator();
            chat_area::render(
                ui,
                &self.state.messages,
                &mut self.state.scroll_to_latest,
            );

            ui.separator();
            send = input_bar::render(ui, &mut self.state.input_text);
        });

        if send {
            self.submit();
        }

        ctx.request_repaint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ChatMessage, LiveState, MessageId};

    fn msg(id: u64, text: &str, sender: &str) -> ChatMessage {
        ChatMessage {
            id: id.into(),
            text: text.into(),
            sender: sender.into(),
            timestamp: Some(100),
            client_id: None,
        }
    }

    #[test]
    fn history_then_live_frames_deduplicate() {
        let mut state = AppState::new("User1".into());

        apply_event(
            &mut state,
            NetworkEvent::HistoryLoaded(vec![msg(1, "hi", "User7")]),
        );
        apply_event(
            &mut state,
            NetworkEvent::MessageReceived(msg(1, "hi", "User7")),
        );
        assert_eq!(state.messages.len(), 1);

        apply_event(
            &mut state,
            NetworkEvent::MessageReceived(msg(2, "yo", "User9")),
        );
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].id, MessageId::Number(2));
    }

    #[test]
    fn failures_leave_messages_and_input_alone() {
        let mut state = AppState::new("User1".into());
        state.input_text = "draft".into();

        apply_event(&mut state, NetworkEvent::HistoryFailed("refused".into()));
        apply_event(&mut state, NetworkEvent::SendFailed("refused".into()));
        apply_event(&mut state, NetworkEvent::FrameDropped("bad json".into()));

        assert!(state.messages.is_empty());
        assert_eq!(state.input_text, "draft");
        assert_eq!(state.activity.len(), 3);
    }

    #[test]
    fn live_state_events_update_status() {
        let mut state = AppState::new("User1".into());
        apply_event(
            &mut state,
            NetworkEvent::LiveStateChanged(LiveState::Connecting),
        );
        apply_event(&mut state, NetworkEvent::LiveStateChanged(LiveState::Open));
        assert_eq!(state.live_state, LiveState::Open);
    }

    #[test]
    fn empty_input_sends_no_command() {
        let (cmd_tx, mut cmd_rx) = mpsc::channel(4);
        let (_event_tx, event_rx) = mpsc::channel(4);
        let mut app = ChatApp {
            state: AppState::new("User1".into()),
            command_sender: cmd_tx,
            event_receiver: event_rx,
        };

        app.submit();
        assert!(cmd_rx.try_recv().is_err());

        app.state.input_text = "hello".into();
        app.submit();
        match cmd_rx.try_recv() {
            Ok(NetworkCommand::SendMessage(text)) => assert_eq!(text, "hello"),
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(app.state.input_text, "hello");
    }
}
