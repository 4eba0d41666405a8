//! Background service task — single `select!` loop, no shared state.
//!
//! The service owns the provider and contract handles. It receives
//! [`UiEvent`]s from the UI thread and account events from the provider
//! watcher, performs the remote calls, and answers with [`ServiceEvent`]s.
//!
//! Handlers are awaited inline in the loop, so no two remote sequences ever
//! interleave: an account change arriving while a fund or withdraw is in
//! flight queues up and applies only after that action settles.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::contract::{ContractHandle, InterfaceDescriptor, WithdrawMode};
use crate::events::{BalanceSnapshot, ServiceEvent, UiEvent};
use crate::provider::{BridgeProvider, ProviderError, ProviderEvent, WalletProvider};
use crate::units;

/// Session-side view of the connection, owned by the service task.
pub struct Service {
    svc_tx: mpsc::UnboundedSender<ServiceEvent>,
    provider: Arc<dyn WalletProvider>,
    descriptor: InterfaceDescriptor,
    contract_address: String,
    contract: Option<ContractHandle>,
    account: Option<String>,
    is_owner: bool,
    /// Funded amount from the last refresh, for the client-side withdraw
    /// cap. The contract remains the authoritative limit.
    funded_cache: Option<u128>,
}

impl Service {
    pub fn new(
        svc_tx: mpsc::UnboundedSender<ServiceEvent>,
        provider: Arc<dyn WalletProvider>,
        descriptor: InterfaceDescriptor,
        contract_address: String,
    ) -> Self {
        Self {
            svc_tx,
            provider,
            descriptor,
            contract_address,
            contract: None,
            account: None,
            is_owner: false,
            funded_cache: None,
        }
    }

    fn send(&self, event: ServiceEvent) {
        let _ = self.svc_tx.send(event);
    }

    /// Ask the provider for account access and run the connected
    /// transition on the first account granted.
    pub async fn connect(&mut self) {
        match self.provider.request_accounts().await {
            Ok(accounts) => match accounts.into_iter().next() {
                Some(account) => self.on_connected(account).await,
                None => self.send(ServiceEvent::ConnectFailed {
                    message: "wallet returned no accounts".to_string(),
                }),
            },
            Err(e) => {
                log::warn!("wallet connect failed: {}", e);
                self.send(ServiceEvent::ConnectFailed {
                    message: e.to_string(),
                });
            }
        }
    }

    /// Provider-pushed account change. Idempotent: a repeat of the current
    /// account is a no-op, an empty set disconnects.
    pub async fn on_accounts_changed(&mut self, accounts: Vec<String>) {
        match accounts.into_iter().next() {
            Some(account) => self.on_connected(account).await,
            None => self.disconnect(),
        }
    }

    /// Check for an already-authorized account at startup, without
    /// prompting the user.
    pub async fn check_existing_connection(&mut self) {
        match self.provider.accounts().await {
            Ok(accounts) => {
                if let Some(account) = accounts.into_iter().next() {
                    log::info!("🔗 Reusing authorized account {}", account);
                    self.on_connected(account).await;
                }
            }
            Err(ProviderError::Unavailable(detail)) => {
                log::warn!("no wallet provider detected: {}", detail);
                self.send(ServiceEvent::ConnectFailed {
                    message: "no wallet provider detected".to_string(),
                });
            }
            Err(e) => {
                log::warn!("startup account check failed: {}", e);
            }
        }
    }

    /// The connected transition: instantiate the contract handle, derive
    /// the owner flag, announce the session, refresh balances.
    async fn on_connected(&mut self, account: String) {
        if self.account.as_deref() == Some(account.as_str()) && self.contract.is_some() {
            return;
        }

        let contract = match ContractHandle::new(
            self.provider.clone(),
            self.descriptor.clone(),
            self.contract_address.clone(),
        ) {
            Ok(contract) => contract,
            Err(e) => {
                log::error!("interface descriptor rejected: {}", e);
                self.send(ServiceEvent::ConnectFailed {
                    message: e.to_string(),
                });
                return;
            }
        };

        let is_owner = match contract.owner().await {
            Ok(owner) => owner.eq_ignore_ascii_case(&account),
            Err(e) => {
                log::warn!("owner lookup failed: {}", e);
                false
            }
        };

        log::info!("✅ Wallet connected: {} (owner: {})", account, is_owner);

        let mode = contract.mode();
        self.account = Some(account.clone());
        self.is_owner = is_owner;
        self.contract = Some(contract);
        self.funded_cache = None;
        self.send(ServiceEvent::Connected {
            address: account,
            is_owner,
            mode,
        });
        self.refresh_balances().await;
    }

    fn disconnect(&mut self) {
        if self.account.is_none() {
            return;
        }
        log::info!("👋 Wallet disconnected");
        self.account = None;
        self.is_owner = false;
        self.contract = None;
        self.funded_cache = None;
        self.send(ServiceEvent::Disconnected);
    }

    /// Read all balances for the connected account. Wallet and contract
    /// balances are primary — if either fails the previous values stay on
    /// screen. The per-user funded amount and its USD equivalent degrade
    /// to a placeholder on contracts that lack them or reads that fail.
    pub async fn refresh_balances(&mut self) {
        let (Some(account), Some(contract)) = (self.account.clone(), self.contract.as_ref())
        else {
            return;
        };

        let wallet = match self.provider.balance(&account).await {
            Ok(wei) => wei,
            Err(e) => {
                log::warn!("wallet balance read failed: {}", e);
                self.send(ServiceEvent::BalancesFailed);
                return;
            }
        };
        let contract_balance = match self.provider.balance(contract.address()).await {
            Ok(wei) => wei,
            Err(e) => {
                log::warn!("contract balance read failed: {}", e);
                self.send(ServiceEvent::BalancesFailed);
                return;
            }
        };

        let funded = if contract.supports_funded_amount() {
            match contract.funded_amount(&account).await {
                Ok(wei) => Some(wei),
                Err(e) => {
                    log::warn!("funded amount read failed: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let funded_usd = if contract.supports_usd() {
            match contract.balance_in_usd(&account).await {
                Ok(usd) => Some(usd),
                Err(e) => {
                    log::warn!("USD balance read failed: {}", e);
                    None
                }
            }
        } else {
            None
        };

        self.funded_cache = funded;
        self.send(ServiceEvent::BalancesUpdated(BalanceSnapshot {
            wallet,
            contract: contract_balance,
            funded,
            funded_usd,
        }));
    }

    /// Validate and submit a value-bearing `fund()` call.
    pub async fn fund(&mut self, amount: String) {
        let (Some(account), Some(contract)) = (self.account.clone(), self.contract.as_ref())
        else {
            self.send(ServiceEvent::ActionFailed {
                message: "Please connect your wallet first.".to_string(),
            });
            return;
        };

        let amount_wei = match units::parse_eth(&amount) {
            Ok(wei) => wei,
            Err(e) => {
                log::debug!("fund amount rejected: {}", e);
                self.send(ServiceEvent::ActionFailed {
                    message: "Please enter a valid amount to fund.".to_string(),
                });
                return;
            }
        };

        match contract.fund(&account, amount_wei).await {
            Ok(tx_hash) => {
                log::info!("✅ Fund transaction submitted: {}", tx_hash);
                self.send(ServiceEvent::FundCompleted {
                    amount_eth: amount.trim().to_string(),
                });
                self.refresh_balances().await;
            }
            Err(e) => {
                log::warn!("fund failed: {}", e);
                self.send(ServiceEvent::ActionFailed {
                    message: format!("Failed to fund contract. {}", e),
                });
            }
        }
    }

    /// Submit a withdrawal. The shape depends on the contract capability:
    /// owner-gated deployments drain the whole balance with no amount,
    /// per-user deployments take an amount capped by what this account
    /// funded (a courtesy check — the contract enforces the real limit).
    pub async fn withdraw(&mut self, amount: Option<String>) {
        let (Some(account), Some(contract)) = (self.account.clone(), self.contract.as_ref())
        else {
            self.send(ServiceEvent::ActionFailed {
                message: "Please connect your wallet first.".to_string(),
            });
            return;
        };

        match contract.mode() {
            WithdrawMode::OwnerWithdrawAll => {
                if !self.is_owner {
                    self.send(ServiceEvent::ActionFailed {
                        message: "Only the contract owner can withdraw.".to_string(),
                    });
                    return;
                }
                match contract.withdraw_all(&account).await {
                    Ok(tx_hash) => {
                        log::info!("✅ Withdraw transaction submitted: {}", tx_hash);
                        self.send(ServiceEvent::WithdrawCompleted { amount_eth: None });
                        self.refresh_balances().await;
                    }
                    Err(e) => {
                        log::warn!("withdraw failed: {}", e);
                        self.send(ServiceEvent::ActionFailed {
                            message: format!("Failed to withdraw funds. {}", e),
                        });
                    }
                }
            }

            WithdrawMode::PerUserWithdraw => {
                let amount = amount.unwrap_or_default();
                let amount_wei = match units::parse_eth(&amount) {
                    Ok(wei) => wei,
                    Err(e) => {
                        log::debug!("withdraw amount rejected: {}", e);
                        self.send(ServiceEvent::ActionFailed {
                            message: "Please enter a valid amount to withdraw.".to_string(),
                        });
                        return;
                    }
                };
                if let Some(funded) = self.funded_cache {
                    if amount_wei > funded {
                        self.send(ServiceEvent::ActionFailed {
                            message: "You cannot withdraw more than you've funded.".to_string(),
                        });
                        return;
                    }
                }
                match contract.withdraw_amount(&account, amount_wei).await {
                    Ok(tx_hash) => {
                        log::info!("✅ Withdraw transaction submitted: {}", tx_hash);
                        self.send(ServiceEvent::WithdrawCompleted {
                            amount_eth: Some(amount.trim().to_string()),
                        });
                        self.refresh_balances().await;
                    }
                    Err(e) => {
                        log::warn!("withdraw failed: {}", e);
                        self.send(ServiceEvent::ActionFailed {
                            message: format!("Failed to withdraw funds. {}", e),
                        });
                    }
                }
            }
        }
    }
}

/// Run the service loop until the cancellation token fires.
///
/// This is the **only** `tokio::spawn`ed task in the application (the
/// account watcher aside). It owns the provider and the contract handle.
pub async fn run(
    token: CancellationToken,
    mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
    svc_tx: mpsc::UnboundedSender<ServiceEvent>,
    config: Config,
    descriptor: InterfaceDescriptor,
) {
    let provider: Arc<dyn WalletProvider> =
        Arc::new(BridgeProvider::new(config.rpc_endpoint.clone()));

    let (provider_tx, mut provider_rx) = mpsc::unbounded_channel::<ProviderEvent>();
    let (watch_shutdown_tx, watch_shutdown_rx) = tokio::sync::watch::channel(false);
    let _watcher = crate::provider::watch_accounts(provider.clone(), provider_tx, watch_shutdown_rx);

    let mut service = Service::new(
        svc_tx,
        provider,
        descriptor,
        config.contract_address.clone(),
    );

    // Reuse an already-authorized account without prompting.
    service.check_existing_connection().await;

    log::info!("🚀 Service loop started ({})", config.network);

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                log::info!("🛑 Service loop shutting down");
                let _ = watch_shutdown_tx.send(true);
                break;
            }

            Some(event) = provider_rx.recv() => {
                match event {
                    ProviderEvent::AccountsChanged(accounts) => {
                        service.on_accounts_changed(accounts).await;
                    }
                }
            }

            Some(event) = ui_rx.recv() => {
                match event {
                    UiEvent::Shutdown => {
                        let _ = watch_shutdown_tx.send(true);
                        break;
                    }
                    UiEvent::Connect => service.connect().await,
                    UiEvent::RefreshBalances => service.refresh_balances().await,
                    UiEvent::Fund { amount } => service.fund(amount).await,
                    UiEvent::Withdraw { amount } => service.withdraw(amount).await,
                }
            }

            else => break,
        }
    }
}
