//! Contract interface descriptor and typed method bindings.
//!
//! The descriptor is a fixed, versioned JSON document describing the deployed
//! contract's callable surface. It must match the deployment exactly — a
//! mismatch is a configuration error caught at startup, never a runtime
//! condition to recover from. Which optional methods the descriptor exposes
//! decides the withdraw capability of the handle.

use std::sync::Arc;

use serde::Deserialize;
use sha3::{Digest, Keccak256};

use crate::provider::{ProviderError, WalletProvider};

/// Descriptor for the shared FundMe deployment: any funder may withdraw up
/// to their own funded amount, and the contract prices balances in USD.
pub const FUNDER_DESCRIPTOR_JSON: &str = include_str!("../abi/fundme_funder.json");

/// Descriptor for the owner-gated FundMe deployment: only the recorded
/// owner may withdraw, and only the whole contract balance.
pub const OWNER_DESCRIPTOR_JSON: &str = include_str!("../abi/fundme_owner.json");

#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("descriptor is not valid ABI JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("descriptor is missing required method {0}")]
    MissingMethod(&'static str),

    #[error("descriptor exposes no usable withdraw method")]
    NoWithdraw,
}

/// How the configured contract lets funds leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawMode {
    /// `withdraw()` — the recorded owner drains the whole contract balance.
    OwnerWithdrawAll,
    /// `withdraw(amount)` — each funder may reclaim up to what they funded.
    PerUserWithdraw,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AbiParam {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AbiEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default, rename = "stateMutability")]
    pub state_mutability: String,
}

/// Parsed contract interface description.
#[derive(Debug, Clone)]
pub struct InterfaceDescriptor {
    entries: Vec<AbiEntry>,
}

impl InterfaceDescriptor {
    pub fn from_json(json: &str) -> Result<Self, DescriptorError> {
        let entries: Vec<AbiEntry> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    fn function(&self, name: &str, arity: usize) -> Option<&AbiEntry> {
        self.entries
            .iter()
            .find(|e| e.kind == "function" && e.name == name && e.inputs.len() == arity)
    }

    pub fn has_function(&self, name: &str, arity: usize) -> bool {
        self.function(name, arity).is_some()
    }

    /// Canonical signature ("name(type,type)") for selector derivation.
    fn signature(&self, name: &str, arity: usize) -> Option<String> {
        let entry = self.function(name, arity)?;
        let params: Vec<&str> = entry.inputs.iter().map(|p| p.kind.as_str()).collect();
        Some(format!("{}({})", entry.name, params.join(",")))
    }

    /// Derive the withdraw capability from the optional methods present.
    pub fn withdraw_mode(&self) -> Result<WithdrawMode, DescriptorError> {
        if self.has_function("getFundedAmount", 1) && self.has_function("withdraw", 1) {
            Ok(WithdrawMode::PerUserWithdraw)
        } else if self.has_function("withdraw", 0) {
            Ok(WithdrawMode::OwnerWithdrawAll)
        } else {
            Err(DescriptorError::NoWithdraw)
        }
    }

    /// Check the required core surface and return the withdraw capability.
    pub fn validate(&self) -> Result<WithdrawMode, DescriptorError> {
        if !self.has_function("fund", 0) {
            return Err(DescriptorError::MissingMethod("fund()"));
        }
        if !self.has_function("getOwner", 0) {
            return Err(DescriptorError::MissingMethod("getOwner()"));
        }
        self.withdraw_mode()
    }
}

// ============================================================================
// ABI encoding helpers
// ============================================================================

/// First four bytes of keccak256 over the canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let mut hasher = Keccak256::new();
    hasher.update(signature.as_bytes());
    let digest = hasher.finalize();
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Is this a well-formed 0x-prefixed 20-byte address?
pub fn is_address(s: &str) -> bool {
    s.len() == 42
        && s.starts_with("0x")
        && s[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

fn encode_address(address: &str) -> Result<[u8; 32], ProviderError> {
    if !is_address(address) {
        return Err(ProviderError::InvalidResponse(format!(
            "malformed address {}",
            address
        )));
    }
    let raw = hex::decode(&address[2..])
        .map_err(|e| ProviderError::InvalidResponse(format!("malformed address: {}", e)))?;
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(&raw);
    Ok(word)
}

fn encode_u256(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn decode_u256(data: &[u8]) -> Result<u128, ProviderError> {
    if data.len() < 32 {
        return Err(ProviderError::InvalidResponse(format!(
            "return data too short: {} bytes",
            data.len()
        )));
    }
    if data[..16].iter().any(|&b| b != 0) {
        return Err(ProviderError::InvalidResponse(
            "uint256 value exceeds u128".into(),
        ));
    }
    let mut raw = [0u8; 16];
    raw.copy_from_slice(&data[16..32]);
    Ok(u128::from_be_bytes(raw))
}

fn decode_address(data: &[u8]) -> Result<String, ProviderError> {
    if data.len() < 32 {
        return Err(ProviderError::InvalidResponse(format!(
            "return data too short: {} bytes",
            data.len()
        )));
    }
    Ok(format!("0x{}", hex::encode(&data[12..32])))
}

// ============================================================================
// Contract handle
// ============================================================================

/// Callable bindings for one deployed contract, built from a provider and a
/// validated interface descriptor.
pub struct ContractHandle {
    provider: Arc<dyn WalletProvider>,
    address: String,
    descriptor: InterfaceDescriptor,
    mode: WithdrawMode,
}

impl ContractHandle {
    pub fn new(
        provider: Arc<dyn WalletProvider>,
        descriptor: InterfaceDescriptor,
        address: String,
    ) -> Result<Self, DescriptorError> {
        let mode = descriptor.validate()?;
        Ok(Self {
            provider,
            address,
            descriptor,
            mode,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn mode(&self) -> WithdrawMode {
        self.mode
    }

    pub fn supports_funded_amount(&self) -> bool {
        self.descriptor.has_function("getFundedAmount", 1)
    }

    pub fn supports_usd(&self) -> bool {
        self.descriptor.has_function("getBalanceInUSD", 1)
    }

    /// The address the contract designates as privileged for withdrawal.
    pub async fn owner(&self) -> Result<String, ProviderError> {
        let data = selector("getOwner()").to_vec();
        let ret = self.provider.call(&self.address, data).await?;
        decode_address(&ret)
    }

    /// Running total this funder has put into the contract, in wei.
    pub async fn funded_amount(&self, funder: &str) -> Result<u128, ProviderError> {
        let ret = self.view_call("getFundedAmount", funder).await?;
        decode_u256(&ret)
    }

    /// USD equivalent of this funder's balance (18-decimal fixed point).
    pub async fn balance_in_usd(&self, funder: &str) -> Result<u128, ProviderError> {
        let ret = self.view_call("getBalanceInUSD", funder).await?;
        decode_u256(&ret)
    }

    /// Submit a value-bearing `fund()` call from the connected account.
    pub async fn fund(&self, from: &str, value: u128) -> Result<String, ProviderError> {
        let data = selector("fund()").to_vec();
        self.provider
            .send_transaction(from, &self.address, value, data)
            .await
    }

    /// Drain the whole contract balance (owner-gated deployments).
    pub async fn withdraw_all(&self, from: &str) -> Result<String, ProviderError> {
        let data = selector("withdraw()").to_vec();
        self.provider
            .send_transaction(from, &self.address, 0, data)
            .await
    }

    /// Reclaim part of this funder's balance (per-user deployments).
    pub async fn withdraw_amount(&self, from: &str, amount: u128) -> Result<String, ProviderError> {
        let sig = self.descriptor.signature("withdraw", 1).ok_or_else(|| {
            ProviderError::InvalidResponse("descriptor lacks withdraw(amount)".into())
        })?;
        let mut data = selector(&sig).to_vec();
        data.extend_from_slice(&encode_u256(amount));
        self.provider
            .send_transaction(from, &self.address, 0, data)
            .await
    }

    async fn view_call(&self, name: &str, address_arg: &str) -> Result<Vec<u8>, ProviderError> {
        let sig = self
            .descriptor
            .signature(name, 1)
            .ok_or_else(|| ProviderError::InvalidResponse(format!("descriptor lacks {}", name)))?;
        let mut data = selector(&sig).to_vec();
        data.extend_from_slice(&encode_address(address_arg)?);
        self.provider.call(&self.address, data).await
    }
}
