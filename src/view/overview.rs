//! Overview section — connected account and balance display.

use egui::Ui;
use tokio::sync::mpsc;

use crate::contract::WithdrawMode;
use crate::events::UiEvent;
use crate::state::{PendingAction, SessionState};
use crate::units;

/// Render the overview section.
pub fn show(
    ui: &mut Ui,
    state: &SessionState,
    network: &str,
    ui_tx: &mpsc::UnboundedSender<UiEvent>,
) {
    let busy = state.pending != PendingAction::Idle;

    ui.horizontal(|ui| {
        ui.heading("Overview");
        ui.add_space(10.0);

        if ui.add_enabled(!busy, egui::Button::new("Refresh")).clicked() {
            let _ = ui_tx.send(UiEvent::RefreshBalances);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if let Some(short) = state.short_address() {
                ui.label(egui::RichText::new(short).monospace());
            }
            ui.label(egui::RichText::new(network).color(egui::Color32::GRAY));
            if state.is_owner {
                ui.label(egui::RichText::new("owner").color(egui::Color32::YELLOW));
            }
        });
    });

    ui.separator();
    ui.add_space(10.0);

    // Balance card
    ui.group(|ui| {
        ui.set_min_width(ui.available_width());
        ui.vertical(|ui| {
            ui.label(
                egui::RichText::new("Wallet Balance")
                    .size(14.0)
                    .color(egui::Color32::GRAY),
            );
            ui.add_space(4.0);
            ui.label(
                egui::RichText::new(format!("{} ETH", units::format_eth(state.balances.wallet)))
                    .size(32.0)
                    .strong(),
            );

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.label(format!(
                    "Contract balance: {} ETH",
                    units::format_eth(state.balances.contract)
                ));

                if state.withdraw_mode == Some(WithdrawMode::PerUserWithdraw) {
                    ui.add_space(20.0);
                    // "?" marks a funded-amount read the contract refused
                    let funded = match state.balances.funded {
                        Some(wei) => format!("{} ETH", units::format_eth(wei)),
                        None => "?".to_string(),
                    };
                    ui.label(format!("You funded: {}", funded));

                    if let Some(usd) = state.balances.funded_usd {
                        ui.label(
                            egui::RichText::new(format!("≈ ${}", units::format_usd(usd)))
                                .color(egui::Color32::GRAY),
                        );
                    }
                }
            });
        });
    });
}
