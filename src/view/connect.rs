//! Connect screen — shown while no wallet session is active.

use egui::Ui;
use tokio::sync::mpsc;

use crate::events::UiEvent;

/// Render the connect screen.
pub fn show(ui: &mut Ui, ui_tx: &mpsc::UnboundedSender<UiEvent>) {
    ui.vertical_centered(|ui| {
        ui.add_space(80.0);

        ui.heading(egui::RichText::new("FundMe").size(32.0).strong());
        ui.add_space(8.0);
        ui.label(
            egui::RichText::new("Fund the contract, track your contribution, withdraw.")
                .size(14.0)
                .color(egui::Color32::GRAY),
        );

        ui.add_space(40.0);

        if ui
            .add(
                egui::Button::new(egui::RichText::new("CONNECT WALLET").size(18.0))
                    .min_size(egui::vec2(260.0, 50.0)),
            )
            .clicked()
        {
            let _ = ui_tx.send(UiEvent::Connect);
        }

        ui.add_space(12.0);
        ui.label(
            egui::RichText::new("Requires a running wallet bridge that holds your keys.")
                .size(12.0)
                .color(egui::Color32::GRAY),
        );
    });
}
