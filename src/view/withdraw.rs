//! Withdraw section — shape depends on the contract's withdraw capability.

use egui::Ui;
use tokio::sync::mpsc;

use crate::contract::WithdrawMode;
use crate::events::UiEvent;
use crate::state::{PendingAction, SessionState};
use crate::units;

/// Render the withdraw section.
pub fn show(ui: &mut Ui, state: &mut SessionState, ui_tx: &mpsc::UnboundedSender<UiEvent>) {
    ui.heading("Withdraw");
    ui.add_space(5.0);

    match state.withdraw_mode {
        Some(WithdrawMode::OwnerWithdrawAll) => show_owner_withdraw(ui, state, ui_tx),
        Some(WithdrawMode::PerUserWithdraw) => show_per_user_withdraw(ui, state, ui_tx),
        None => {}
    }
}

/// Owner-gated deployments: one button, no amount, drains the contract.
fn show_owner_withdraw(
    ui: &mut Ui,
    state: &mut SessionState,
    ui_tx: &mpsc::UnboundedSender<UiEvent>,
) {
    ui.group(|ui| {
        ui.set_min_width(ui.available_width());

        ui.label(format!(
            "Withdraws the entire contract balance ({} ETH).",
            units::format_eth(state.balances.contract)
        ));

        if !state.is_owner {
            ui.colored_label(
                egui::Color32::YELLOW,
                "Only the contract owner can withdraw.",
            );
        }

        ui.add_space(10.0);

        let withdrawing = state.pending == PendingAction::Withdrawing;
        let label = if withdrawing { "PROCESSING..." } else { "WITHDRAW" };
        let can_withdraw = state.is_owner && state.pending == PendingAction::Idle;

        if ui
            .add_enabled(
                can_withdraw,
                egui::Button::new(egui::RichText::new(label).size(16.0))
                    .min_size(egui::vec2(160.0, 36.0)),
            )
            .clicked()
        {
            state.pending = PendingAction::Withdrawing;
            let _ = ui_tx.send(UiEvent::Withdraw { amount: None });
        }

        if withdrawing {
            ui.spinner();
        }
    });
}

/// Per-user deployments: amount form, capped by the funded amount.
fn show_per_user_withdraw(
    ui: &mut Ui,
    state: &mut SessionState,
    ui_tx: &mpsc::UnboundedSender<UiEvent>,
) {
    ui.group(|ui| {
        ui.set_min_width(ui.available_width());

        ui.label("Amount (ETH)");
        ui.add(
            egui::TextEdit::singleline(&mut state.withdraw_input)
                .hint_text("0.1")
                .desired_width(200.0),
        );

        ui.add_space(4.0);
        if let Some(funded) = state.balances.funded {
            ui.label(
                egui::RichText::new(format!(
                    "Available to withdraw: {} ETH",
                    units::format_eth(funded)
                ))
                .color(egui::Color32::GRAY),
            );
        }

        ui.add_space(10.0);

        let withdrawing = state.pending == PendingAction::Withdrawing;
        let label = if withdrawing { "PROCESSING..." } else { "WITHDRAW" };

        if ui
            .add_enabled(
                state.pending == PendingAction::Idle,
                egui::Button::new(egui::RichText::new(label).size(16.0))
                    .min_size(egui::vec2(160.0, 36.0)),
            )
            .clicked()
        {
            state.pending = PendingAction::Withdrawing;
            let _ = ui_tx.send(UiEvent::Withdraw {
                amount: Some(state.withdraw_input.clone()),
            });
        }

        if withdrawing {
            ui.spinner();
        }
    });
}
