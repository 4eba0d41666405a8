//! Event types for communication between UI and service task.
//!
//! These two enums are the *only* interface between the synchronous egui
//! render loop and the asynchronous service task. No shared state, no Arc,
//! no Mutex.

use crate::contract::WithdrawMode;

// ============================================================================
// UI → Service
// ============================================================================

/// Commands sent from the UI thread to the background service task.
#[derive(Debug)]
pub enum UiEvent {
    /// Ask the wallet provider to authorize account access.
    Connect,

    /// Re-read all balances for the connected account.
    RefreshBalances,

    /// Fund the contract with a human-entered ETH amount.
    Fund { amount: String },

    /// Withdraw from the contract. The amount is present on per-user
    /// deployments and absent on owner-gated ones.
    Withdraw { amount: Option<String> },

    /// Clean shutdown.
    Shutdown,
}

// ============================================================================
// Service → UI
// ============================================================================

/// Raw smallest-unit balances read in one refresh pass.
///
/// `None` in an optional field means the read is unsupported by the
/// configured contract or failed this pass — rendered as a placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceSnapshot {
    pub wallet: u128,
    pub contract: u128,
    pub funded: Option<u128>,
    pub funded_usd: Option<u128>,
}

/// Events sent from the service task back to the UI thread.
///
/// Every fund/withdraw request is answered by exactly one terminal event
/// (`FundCompleted`, `WithdrawCompleted`, or `ActionFailed`), so a busy
/// control can never be left disabled.
#[derive(Debug)]
pub enum ServiceEvent {
    /// Wallet connected (or the active account switched).
    Connected {
        address: String,
        is_owner: bool,
        mode: WithdrawMode,
    },

    /// Connection attempt failed; the session stays disconnected.
    ConnectFailed { message: String },

    /// The provider reported an empty account set.
    Disconnected,

    /// Fresh balance snapshot.
    BalancesUpdated(BalanceSnapshot),

    /// A primary balance read failed — keep the previous values on screen.
    BalancesFailed,

    /// `fund` submitted successfully; amount is the display-unit string.
    FundCompleted { amount_eth: String },

    /// `withdraw` submitted successfully; amount present on per-user
    /// deployments.
    WithdrawCompleted { amount_eth: Option<String> },

    /// A fund/withdraw request ended in failure (validation or remote).
    ActionFailed { message: String },
}
