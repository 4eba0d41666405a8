//! Fund section — amount form and submit control.

use egui::Ui;
use tokio::sync::mpsc;

use crate::events::UiEvent;
use crate::state::{PendingAction, SessionState};

/// Render the fund section.
pub fn show(ui: &mut Ui, state: &mut SessionState, ui_tx: &mpsc::UnboundedSender<UiEvent>) {
    ui.heading("Fund");
    ui.add_space(5.0);

    ui.group(|ui| {
        ui.set_min_width(ui.available_width());

        ui.label("Amount (ETH)");
        ui.add(
            egui::TextEdit::singleline(&mut state.fund_input)
                .hint_text("0.1")
                .desired_width(200.0),
        );

        ui.add_space(10.0);

        let funding = state.pending == PendingAction::Funding;
        let label = if funding { "PROCESSING..." } else { "FUND" };

        if ui
            .add_enabled(
                state.pending == PendingAction::Idle,
                egui::Button::new(egui::RichText::new(label).size(16.0))
                    .min_size(egui::vec2(160.0, 36.0)),
            )
            .clicked()
        {
            state.pending = PendingAction::Funding;
            let _ = ui_tx.send(UiEvent::Fund {
                amount: state.fund_input.clone(),
            });
        }

        if funding {
            ui.spinner();
        }
    });
}
