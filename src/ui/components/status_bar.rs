use eframe::egui;

use crate::common::LiveState;
use crate::ui::state::AppState;

pub fn render(ui: &mut egui::Ui, state: &AppState) {
    ui.horizontal(|ui| {
        ui.label("Signed in as");
        ui.label(egui::RichText::new(&state.username).strong());
        ui.separator();

        let color = match state.live_state {
            LiveState::Open => egui::Color32::GREEN,
            LiveState::Connecting => egui::Color32::YELLOW,
            LiveState::Errored => egui::Color32::RED,
            LiveState::Unconnected | LiveState::Closed => egui::Color32::GRAY,
        };
        ui.colored_label(color, "●");
        ui.label(format!("Live: {}", state.live_state.label()));
    });
}
