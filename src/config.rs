//! Client configuration.
//!
//! The client only needs to know:
//! - Which network the contract lives on
//! - Where to reach the wallet bridge (JSON-RPC endpoint)
//! - The deployed contract address and its interface descriptor

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::contract::{
    self, DescriptorError, InterfaceDescriptor, FUNDER_DESCRIPTOR_JSON, OWNER_DESCRIPTOR_JSON,
};

/// Built-in descriptor profile: per-user withdrawals with USD pricing.
pub const PROFILE_PER_USER: &str = "per-user";
/// Built-in descriptor profile: owner-gated withdraw-all.
pub const PROFILE_OWNER_ONLY: &str = "owner-only";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Network name ("mainnet" or "sepolia"), display only.
    #[serde(default = "default_network")]
    pub network: String,

    /// JSON-RPC endpoint of the wallet bridge.
    #[serde(default = "default_rpc_endpoint")]
    pub rpc_endpoint: String,

    /// Address of the deployed funding contract.
    #[serde(default = "default_contract_address")]
    pub contract_address: String,

    /// Which built-in interface descriptor to use
    /// ("per-user" or "owner-only"). Ignored when `descriptor_path` is set.
    #[serde(default = "default_profile")]
    pub contract_profile: String,

    /// Optional external interface descriptor (ABI JSON file).
    #[serde(default)]
    pub descriptor_path: Option<PathBuf>,
}

fn default_network() -> String {
    "sepolia".to_string()
}

fn default_rpc_endpoint() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_contract_address() -> String {
    "0x8333852b6ED4C7f28834a8D59555C295ea6C0783".to_string()
}

fn default_profile() -> String {
    PROFILE_PER_USER.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: default_network(),
            rpc_endpoint: default_rpc_endpoint(),
            contract_address: default_contract_address(),
            contract_profile: default_profile(),
            descriptor_path: None,
        }
    }
}

impl Config {
    /// Load configuration from disk, creating a default file on first run.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            log::info!("📁 Loading config from: {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)?;
            config.validate()?;
            log::info!(
                "✅ Config loaded: network={}, contract={}",
                config.network,
                config.contract_address
            );
            Ok(config)
        } else {
            log::info!("📝 Creating default config");
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path()?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;
        log::info!("💾 Config saved to: {}", config_path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network != "mainnet" && self.network != "sepolia" {
            return Err(ConfigError::Invalid(format!(
                "unknown network: {}",
                self.network
            )));
        }
        if self.rpc_endpoint.is_empty() {
            return Err(ConfigError::Invalid("empty rpc_endpoint".to_string()));
        }
        if !contract::is_address(&self.contract_address) {
            return Err(ConfigError::Invalid(format!(
                "malformed contract address: {}",
                self.contract_address
            )));
        }
        if self.descriptor_path.is_none()
            && self.contract_profile != PROFILE_PER_USER
            && self.contract_profile != PROFILE_OWNER_ONLY
        {
            return Err(ConfigError::Invalid(format!(
                "unknown contract profile: {}",
                self.contract_profile
            )));
        }
        Ok(())
    }

    /// Resolve the configured interface descriptor. A descriptor that fails
    /// to parse or validate is a configuration error — startup aborts.
    pub fn load_descriptor(&self) -> Result<InterfaceDescriptor, ConfigError> {
        let descriptor = match &self.descriptor_path {
            Some(path) => {
                log::info!("📁 Loading interface descriptor from: {}", path.display());
                let json = fs::read_to_string(path)?;
                InterfaceDescriptor::from_json(&json)?
            }
            None => match self.contract_profile.as_str() {
                PROFILE_PER_USER => InterfaceDescriptor::from_json(FUNDER_DESCRIPTOR_JSON)?,
                PROFILE_OWNER_ONLY => InterfaceDescriptor::from_json(OWNER_DESCRIPTOR_JSON)?,
                other => {
                    return Err(ConfigError::Invalid(format!(
                        "unknown contract profile: {}",
                        other
                    )))
                }
            },
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Config file path under the user data directory.
    fn config_path() -> Result<PathBuf, ConfigError> {
        let mut path = Self::data_dir()?;
        path.push("config.toml");
        Ok(path)
    }

    /// Base data directory (`~/.fundme-gui`).
    pub fn data_dir() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".fundme-gui"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config write error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("could not determine home directory")]
    NoHomeDir,

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("interface descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::WithdrawMode;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.network, "sepolia");
        assert_eq!(config.contract_profile, PROFILE_PER_USER);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.network = "ropsten".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.contract_address = "not-an-address".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.contract_profile = "bogus".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serialization_round_trip() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config.network, deserialized.network);
        assert_eq!(config.contract_address, deserialized.contract_address);
    }

    #[test]
    fn test_builtin_descriptor_profiles() {
        let config = Config::default();
        let descriptor = config.load_descriptor().unwrap();
        assert_eq!(descriptor.validate().unwrap(), WithdrawMode::PerUserWithdraw);

        let mut config = Config::default();
        config.contract_profile = PROFILE_OWNER_ONLY.to_string();
        let descriptor = config.load_descriptor().unwrap();
        assert_eq!(
            descriptor.validate().unwrap(),
            WithdrawMode::OwnerWithdrawAll
        );
    }
}
