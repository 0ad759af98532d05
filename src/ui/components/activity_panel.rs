use eframe::egui;

use crate::ui::state::{ActivityKind, AppState};

pub fn render(ui: &mut egui::Ui, state: &AppState) {
    ui.heading("Activity");
    ui.separator();

    ui.horizontal(|ui| {
        ui.label("Messages:");
        ui.label(format!("{}", state.messages.len()));
    });

    ui.separator();

    egui::ScrollArea::vertical()
        .id_salt("activity_scroll")
        .show(ui, |ui| {
            for event in state.activity.iter().rev().take(20) {
                let time_str = event.timestamp.format("%H:%M:%S");
                let color = match event.kind {
                    ActivityKind::Connection => egui::Color32::LIGHT_BLUE,
                    ActivityKind::History => egui::Color32::GREEN,
                    ActivityKind::Duplicate => egui::Color32::YELLOW,
                    ActivityKind::Dropped | ActivityKind::Failure => egui::Color32::RED,
                };

                ui.horizontal(|ui| {
                    ui.colored_label(color, format!("[{}]", time_str));
                    ui.label(&event.message);
                });
            }
        });
}
