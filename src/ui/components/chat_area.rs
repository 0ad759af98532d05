use chrono::{DateTime, Local};
use eframe::egui;

use crate::common::ChatMessage;

pub fn render(ui: &mut egui::Ui, messages: &[ChatMessage], scroll_to_latest: &mut bool) {
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .max_height(ui.available_height() - 40.0)
        .show(ui, |ui| {
            if messages.is_empty() {
                ui.label(egui::RichText::new("No messages yet").weak());
            }

            for message in messages {
                ui.horizontal_wrapped(|ui| {
                    if let Some(time) = format_time(message.timestamp) {
                        ui.label(egui::RichText::new(time).weak());
                    }
                    ui.label(egui::RichText::new(&message.sender).strong());
                    ui.label(&message.text);
                });
            }

            if *scroll_to_latest {
                ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                *scroll_to_latest = false;
            }
        });
}

fn format_time(timestamp: Option<i64>) -> Option<String> {
    let utc = DateTime::from_timestamp_millis(timestamp?)?;
    Some(utc.with_timezone(&Local).format("%H:%M").to_string())
}
