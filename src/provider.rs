//! Wallet-provider bridge — JSON-RPC 2.0 over HTTP.
//!
//! The bridge (a local node or wallet daemon) owns the keys: it prompts the
//! user for account access, signs transactions, and exposes the standard
//! `eth_*` method surface. This client never touches key material.
//!
//! [`WalletProvider`] is the seam the service task talks through, so tests
//! can substitute a scripted provider for the real bridge.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Error code wallet bridges return when the user declines a request.
const CODE_USER_REJECTED: i64 = 4001;

/// How often the account watcher polls `eth_accounts`.
const ACCOUNT_POLL_SECS: u64 = 3;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("no wallet provider reachable: {0}")]
    Unavailable(String),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("RPC error {0}: {1}")]
    Rpc(i64, String),

    #[error("HTTP error {0}")]
    Http(u16),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// The capability surface this client needs from a wallet provider.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the bridge to authorize account access, prompting the user
    /// if necessary (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError>;

    /// Accounts already authorized for this client, without prompting
    /// (`eth_accounts`).
    async fn accounts(&self) -> Result<Vec<String>, ProviderError>;

    /// Native balance of an address, in wei.
    async fn balance(&self, address: &str) -> Result<u128, ProviderError>;

    /// Read-only contract call. Returns the raw return data.
    async fn call(&self, to: &str, data: Vec<u8>) -> Result<Vec<u8>, ProviderError>;

    /// Submit a value-bearing transaction, signed by the bridge.
    /// Returns the transaction hash.
    async fn send_transaction(
        &self,
        from: &str,
        to: &str,
        value: u128,
        data: Vec<u8>,
    ) -> Result<String, ProviderError>;
}

/// Account-set changes pushed out of the watcher task.
#[derive(Debug, Clone)]
pub enum ProviderEvent {
    AccountsChanged(Vec<String>),
}

// ============================================================================
// JSON-RPC bridge implementation
// ============================================================================

#[derive(Debug, Clone)]
pub struct BridgeProvider {
    endpoint: String,
    client: Client,
}

/// JSON-RPC 2.0 request
#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: &'static str,
    id: String,
    method: String,
    params: serde_json::Value,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: Option<String>,
    #[allow(dead_code)]
    id: Option<serde_json::Value>,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

impl BridgeProvider {
    pub fn new(endpoint: String) -> Self {
        let endpoint = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint
        } else {
            format!("http://{}", endpoint)
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        log::info!("📡 Wallet bridge client initialized: {}", endpoint);

        Self { endpoint, client }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send a JSON-RPC 2.0 request and return the result value.
    async fn rpc_call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        let id = REQUEST_ID.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: id.to_string(),
            method: method.to_string(),
            params,
        };

        log::debug!("→ RPC {}: {:?}", method, request.params);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ProviderError::Unavailable(e.to_string())
                } else {
                    ProviderError::Transport(e)
                }
            })?;

        if !response.status().is_success() {
            return Err(ProviderError::Http(response.status().as_u16()));
        }

        let rpc_response: JsonRpcResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("failed to parse JSON-RPC response: {}", e))
        })?;

        if let Some(error) = rpc_response.error {
            if error.code == CODE_USER_REJECTED {
                return Err(ProviderError::Rejected(error.message));
            }
            return Err(ProviderError::Rpc(error.code, error.message));
        }

        rpc_response
            .result
            .ok_or_else(|| ProviderError::InvalidResponse("no result in JSON-RPC response".into()))
    }
}

#[async_trait]
impl WalletProvider for BridgeProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        let result = self
            .rpc_call("eth_requestAccounts", serde_json::json!([]))
            .await?;
        parse_accounts(result)
    }

    async fn accounts(&self) -> Result<Vec<String>, ProviderError> {
        let result = self.rpc_call("eth_accounts", serde_json::json!([])).await?;
        parse_accounts(result)
    }

    async fn balance(&self, address: &str) -> Result<u128, ProviderError> {
        let result = self
            .rpc_call("eth_getBalance", serde_json::json!([address, "latest"]))
            .await?;
        parse_quantity(&result)
    }

    async fn call(&self, to: &str, data: Vec<u8>) -> Result<Vec<u8>, ProviderError> {
        let result = self
            .rpc_call(
                "eth_call",
                serde_json::json!([{"to": to, "data": hex_data(&data)}, "latest"]),
            )
            .await?;
        let text = result
            .as_str()
            .ok_or_else(|| ProviderError::InvalidResponse("eth_call result is not a string".into()))?;
        hex::decode(text.trim_start_matches("0x"))
            .map_err(|e| ProviderError::InvalidResponse(format!("bad call return data: {}", e)))
    }

    async fn send_transaction(
        &self,
        from: &str,
        to: &str,
        value: u128,
        data: Vec<u8>,
    ) -> Result<String, ProviderError> {
        let result = self
            .rpc_call(
                "eth_sendTransaction",
                serde_json::json!([{
                    "from": from,
                    "to": to,
                    "value": quantity_hex(value),
                    "data": hex_data(&data),
                }]),
            )
            .await?;
        let hash = result.as_str().ok_or_else(|| {
            ProviderError::InvalidResponse("eth_sendTransaction result is not a string".into())
        })?;
        Ok(hash.to_string())
    }
}

fn parse_accounts(result: serde_json::Value) -> Result<Vec<String>, ProviderError> {
    serde_json::from_value(result)
        .map_err(|e| ProviderError::InvalidResponse(format!("bad account list: {}", e)))
}

/// Parse a 0x-prefixed hex quantity into wei.
pub fn parse_quantity(value: &serde_json::Value) -> Result<u128, ProviderError> {
    let text = value
        .as_str()
        .ok_or_else(|| ProviderError::InvalidResponse("quantity is not a string".into()))?;
    let digits = text.trim_start_matches("0x");
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16)
        .map_err(|e| ProviderError::InvalidResponse(format!("bad quantity {}: {}", text, e)))
}

/// Encode a wei amount as a 0x-prefixed hex quantity.
pub fn quantity_hex(value: u128) -> String {
    format!("{:#x}", value)
}

/// Encode raw bytes as 0x-prefixed calldata.
pub fn hex_data(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

// ============================================================================
// Account watcher
// ============================================================================

/// Watch the provider's authorized-account set and push a
/// [`ProviderEvent::AccountsChanged`] whenever it differs from the last
/// observed set.
///
/// HTTP bridges have no push channel, so this poll is the transport-level
/// stand-in for the `accountsChanged` event injected providers emit. The
/// first successful read only seeds the baseline — the service does its own
/// startup account check.
pub fn watch_accounts(
    provider: Arc<dyn WalletProvider>,
    event_tx: mpsc::UnboundedSender<ProviderEvent>,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(ACCOUNT_POLL_SECS));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut last_seen: Option<Vec<String>> = None;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match provider.accounts().await {
                        Ok(accounts) => {
                            let changed = matches!(&last_seen, Some(seen) if *seen != accounts);
                            if changed {
                                log::info!("👛 Account set changed: {} account(s)", accounts.len());
                                if event_tx.send(ProviderEvent::AccountsChanged(accounts.clone())).is_err() {
                                    break;
                                }
                            }
                            last_seen = Some(accounts);
                        }
                        Err(e) => {
                            // A dead bridge is not a disconnect — keep the last
                            // known account set until it answers again.
                            log::debug!("account poll failed: {}", e);
                        }
                    }
                }

                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        log::info!("🛑 Account watcher shutting down");
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_normalization() {
        let provider = BridgeProvider::new("127.0.0.1:8545".to_string());
        assert_eq!(provider.endpoint(), "http://127.0.0.1:8545");

        let provider = BridgeProvider::new("https://bridge.example:8545".to_string());
        assert_eq!(provider.endpoint(), "https://bridge.example:8545");
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(&serde_json::json!("0x0")).unwrap(), 0);
        assert_eq!(parse_quantity(&serde_json::json!("0x")).unwrap(), 0);
        assert_eq!(
            parse_quantity(&serde_json::json!("0xde0b6b3a7640000")).unwrap(),
            1_000_000_000_000_000_000
        );
        assert!(parse_quantity(&serde_json::json!("0xzz")).is_err());
        assert!(parse_quantity(&serde_json::json!(42)).is_err());
    }

    #[test]
    fn test_quantity_hex_round_trip() {
        let wei = 1_500_000_000_000_000_000u128;
        let encoded = quantity_hex(wei);
        assert_eq!(
            parse_quantity(&serde_json::json!(encoded)).unwrap(),
            wei
        );
    }

    #[test]
    fn test_hex_data() {
        assert_eq!(hex_data(&[0xb6, 0x0d, 0x42, 0x88]), "0xb60d4288");
        assert_eq!(hex_data(&[]), "0x");
    }
}
