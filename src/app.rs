//! Application struct — the eframe::App implementation.
//!
//! Thin wrapper: drains service events, expires the notice, dispatches to
//! view modules. No async, no network, no contract logic.

use std::time::Instant;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::contract::InterfaceDescriptor;
use crate::events::{ServiceEvent, UiEvent};
use crate::state::{SessionState, Severity};
use crate::view;

/// The wallet application.
pub struct App {
    pub state: SessionState,
    pub ui_tx: mpsc::UnboundedSender<UiEvent>,
    svc_rx: mpsc::UnboundedReceiver<ServiceEvent>,
    shutdown_token: CancellationToken,
    network: String,
}

impl App {
    /// Create a new App, spawning the background service task.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: Config,
        descriptor: InterfaceDescriptor,
    ) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let (svc_tx, svc_rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();

        let network = config.network.clone();

        // Spawn the single background service task
        let svc_token = token.clone();
        tokio::spawn(crate::service::run(
            svc_token, ui_rx, svc_tx, config, descriptor,
        ));

        Self {
            state: SessionState::default(),
            ui_tx,
            svc_rx,
            shutdown_token: token,
            network,
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown_token.cancel();
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Ensure we repaint regularly to pick up background service events
        ctx.request_repaint_after(std::time::Duration::from_secs(1));

        // 1. Drain all pending service events (non-blocking)
        while let Ok(event) = self.svc_rx.try_recv() {
            self.state.apply(event);
            ctx.request_repaint();
        }

        // 2. Expire the transient notice
        self.state.dismiss_expired(Instant::now());

        // 3. Notice bar
        if let Some(notice) = self.state.notice.clone() {
            egui::TopBottomPanel::bottom("notice").show(ctx, |ui| {
                let color = match notice.severity {
                    Severity::Info => egui::Color32::GRAY,
                    Severity::Success => egui::Color32::GREEN,
                    Severity::Error => egui::Color32::RED,
                };
                ui.add_space(4.0);
                ui.colored_label(color, notice.message.as_str());
                ui.add_space(4.0);
            });
        }

        // 4. Central panel — connect screen or the session dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.is_connected() {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    view::overview::show(ui, &self.state, &self.network, &self.ui_tx);
                    ui.add_space(15.0);
                    view::fund::show(ui, &mut self.state, &self.ui_tx);
                    ui.add_space(15.0);
                    view::withdraw::show(ui, &mut self.state, &self.ui_tx);
                });
            } else {
                view::connect::show(ui, &self.ui_tx);
            }
        });
    }
}
