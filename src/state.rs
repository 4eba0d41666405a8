//! Session state — plain data, no async, no Arc.
//!
//! `SessionState` holds everything the UI needs to render. The service task
//! sends `ServiceEvent`s which are applied via `SessionState::apply()`. The
//! views read fields directly and own the two form inputs; everything else
//! is mutated only here.

use std::time::{Duration, Instant};

use crate::contract::WithdrawMode;
use crate::events::{BalanceSnapshot, ServiceEvent};

/// How long a notice stays on screen before auto-dismissing.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Which remote action is in flight, driving button enablement and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingAction {
    #[default]
    Idle,
    Funding,
    Withdrawing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// A transient status message. A new notice replaces the current one and
/// restarts the dismissal clock.
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
    pub shown_at: Instant,
}

impl Notice {
    pub fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= NOTICE_TTL
    }
}

/// All session state needed for rendering.
#[derive(Debug)]
pub struct SessionState {
    // -- Connection --
    pub connected_address: Option<String>,
    pub is_owner: bool,
    pub withdraw_mode: Option<WithdrawMode>,

    // -- Balances (raw smallest-unit) --
    pub balances: BalanceSnapshot,

    // -- Form inputs (owned by the views) --
    pub fund_input: String,
    pub withdraw_input: String,

    // -- Transient UI state --
    pub pending: PendingAction,
    pub notice: Option<Notice>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            connected_address: None,
            is_owner: false,
            withdraw_mode: None,
            balances: BalanceSnapshot::default(),
            fund_input: String::new(),
            withdraw_input: String::new(),
            pending: PendingAction::Idle,
            notice: None,
        }
    }
}

impl SessionState {
    pub fn is_connected(&self) -> bool {
        self.connected_address.is_some()
    }

    /// Display-shortened form of the connected address:
    /// first six characters, an ellipsis, then the last four.
    pub fn short_address(&self) -> Option<String> {
        self.connected_address.as_deref().map(|addr| {
            if addr.len() <= 10 {
                addr.to_string()
            } else {
                format!("{}...{}", &addr[..6], &addr[addr.len() - 4..])
            }
        })
    }

    /// Post a transient notice, replacing any current one and restarting
    /// the dismissal clock.
    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) {
        self.notice = Some(Notice {
            message: message.into(),
            severity,
            shown_at: Instant::now(),
        });
    }

    /// Drop the notice once its display window has passed.
    pub fn dismiss_expired(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| n.expired(now)) {
            self.notice = None;
        }
    }

    /// Reset every field that depends on a connected account. Done in one
    /// place so no stale balance can survive a disconnect.
    fn disconnect_reset(&mut self) {
        self.connected_address = None;
        self.is_owner = false;
        self.withdraw_mode = None;
        self.balances = BalanceSnapshot::default();
        self.fund_input.clear();
        self.withdraw_input.clear();
        self.pending = PendingAction::Idle;
    }

    pub fn apply(&mut self, event: ServiceEvent) {
        match event {
            ServiceEvent::Connected {
                address,
                is_owner,
                mode,
            } => {
                self.connected_address = Some(address);
                self.is_owner = is_owner;
                self.withdraw_mode = Some(mode);
            }

            ServiceEvent::ConnectFailed { message } => {
                self.notify(
                    format!("Failed to connect wallet. {}", message),
                    Severity::Error,
                );
            }

            ServiceEvent::Disconnected => {
                self.disconnect_reset();
            }

            ServiceEvent::BalancesUpdated(snapshot) => {
                self.balances = snapshot;
            }

            ServiceEvent::BalancesFailed => {
                self.notify("Failed to update balances.", Severity::Error);
            }

            ServiceEvent::FundCompleted { amount_eth } => {
                self.fund_input.clear();
                self.pending = PendingAction::Idle;
                self.notify(
                    format!("Successfully funded {} ETH!", amount_eth),
                    Severity::Success,
                );
            }

            ServiceEvent::WithdrawCompleted { amount_eth } => {
                self.withdraw_input.clear();
                self.pending = PendingAction::Idle;
                let message = match amount_eth {
                    Some(amount) => format!("Successfully withdrew {} ETH!", amount),
                    None => "Successfully withdrew funds!".to_string(),
                };
                self.notify(message, Severity::Success);
            }

            ServiceEvent::ActionFailed { message } => {
                self.pending = PendingAction::Idle;
                self.notify(message, Severity::Error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected_state() -> SessionState {
        let mut state = SessionState::default();
        state.apply(ServiceEvent::Connected {
            address: "0x8333852b6ED4C7f28834a8D59555C295ea6C0783".to_string(),
            is_owner: false,
            mode: WithdrawMode::PerUserWithdraw,
        });
        state.apply(ServiceEvent::BalancesUpdated(BalanceSnapshot {
            wallet: 10,
            contract: 20,
            funded: Some(5),
            funded_usd: Some(7),
        }));
        state
    }

    #[test]
    fn test_default_state() {
        let state = SessionState::default();
        assert!(!state.is_connected());
        assert_eq!(state.pending, PendingAction::Idle);
        assert_eq!(state.balances, BalanceSnapshot::default());
        assert!(state.short_address().is_none());
    }

    #[test]
    fn test_short_address() {
        let state = connected_state();
        assert_eq!(state.short_address().as_deref(), Some("0x8333...0783"));
    }

    #[test]
    fn test_disconnect_resets_everything() {
        let mut state = connected_state();
        state.fund_input = "0.5".to_string();
        state.withdraw_input = "0.1".to_string();
        state.pending = PendingAction::Funding;

        state.apply(ServiceEvent::Disconnected);

        assert!(!state.is_connected());
        assert!(!state.is_owner);
        assert!(state.withdraw_mode.is_none());
        assert_eq!(state.balances, BalanceSnapshot::default());
        assert!(state.fund_input.is_empty());
        assert!(state.withdraw_input.is_empty());
        assert_eq!(state.pending, PendingAction::Idle);
    }

    #[test]
    fn test_fund_completed_clears_input_and_restores_idle() {
        let mut state = connected_state();
        state.fund_input = "0.5".to_string();
        state.pending = PendingAction::Funding;

        state.apply(ServiceEvent::FundCompleted {
            amount_eth: "0.5".to_string(),
        });

        assert!(state.fund_input.is_empty());
        assert_eq!(state.pending, PendingAction::Idle);
        let notice = state.notice.expect("success notice");
        assert_eq!(notice.severity, Severity::Success);
        assert!(notice.message.contains("0.5 ETH"));
    }

    #[test]
    fn test_action_failed_restores_idle() {
        let mut state = connected_state();
        state.pending = PendingAction::Withdrawing;

        state.apply(ServiceEvent::ActionFailed {
            message: "Failed to withdraw funds. execution reverted".to_string(),
        });

        assert_eq!(state.pending, PendingAction::Idle);
        let notice = state.notice.expect("error notice");
        assert_eq!(notice.severity, Severity::Error);
    }

    #[test]
    fn test_balances_failed_keeps_previous_values() {
        let mut state = connected_state();
        let before = state.balances.clone();

        state.apply(ServiceEvent::BalancesFailed);

        assert_eq!(state.balances, before);
        assert_eq!(
            state.notice.as_ref().map(|n| n.message.as_str()),
            Some("Failed to update balances.")
        );
    }

    #[test]
    fn test_notice_replacement_restarts_clock() {
        let mut state = SessionState::default();
        let t0 = Instant::now();
        state.notice = Some(Notice {
            message: "first".to_string(),
            severity: Severity::Info,
            shown_at: t0 - NOTICE_TTL,
        });
        assert!(state.notice.as_ref().unwrap().expired(t0));

        state.notify("second", Severity::Info);
        let notice = state.notice.as_ref().unwrap();
        assert_eq!(notice.message, "second");
        assert!(!notice.expired(t0));
    }

    #[test]
    fn test_dismiss_expired() {
        let mut state = SessionState::default();
        let t0 = Instant::now();
        state.notice = Some(Notice {
            message: "old".to_string(),
            severity: Severity::Info,
            shown_at: t0,
        });

        state.dismiss_expired(t0 + Duration::from_secs(1));
        assert!(state.notice.is_some());

        state.dismiss_expired(t0 + NOTICE_TTL);
        assert!(state.notice.is_none());
    }

    #[test]
    fn test_reconnect_recomputes_short_address() {
        let mut state = connected_state();
        state.apply(ServiceEvent::Connected {
            address: "0xAbCdEf0123456789aBcDeF0123456789abcdef01".to_string(),
            is_owner: true,
            mode: WithdrawMode::OwnerWithdrawAll,
        });
        assert_eq!(state.short_address().as_deref(), Some("0xAbCd...ef01"));
        assert!(state.is_owner);
    }
}
