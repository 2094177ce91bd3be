use alloy::primitives::{Address, U256};
use config::{Config as ConfigLoader, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;

/// Network constants loaded from configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConstants {
    /// Network name
    pub network_name: String,
    /// EVM chain id
    pub chain_id: u64,
    /// Default RPC endpoint
    pub default_rpc: String,
    /// Native coin symbol
    pub native_symbol: String,
    /// Native coin decimals
    pub native_decimals: u8,
}

impl NetworkConstants {
    /// Create a new NetworkConstants with specified values
    pub fn new(
        network_name: String,
        chain_id: u64,
        default_rpc: String,
        native_symbol: String,
        native_decimals: u8,
    ) -> Self {
        Self {
            network_name,
            chain_id,
            default_rpc,
            native_symbol,
            native_decimals,
        }
    }

    /// Load network constants from the configuration file
    pub fn load(network: &str) -> Result<Self, ConfigError> {
        let config_dir = env::var("MINIDEX_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let settings = ConfigLoader::builder()
            // Add the config file
            .add_source(File::with_name(&format!("{}/network", config_dir)))
            .build()?;

        // Extract the network section
        settings.get::<NetworkConstants>(network)
    }
}

/// Contract address configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractAddresses {
    /// Liquidity pool contract address (also the LP token contract)
    pub liquidity_pool: Address,
    /// First pool token contract address
    pub token_a: Address,
    /// Second pool token contract address
    pub token_b: Address,
}

impl Default for ContractAddresses {
    fn default() -> Self {
        Self {
            liquidity_pool: Address::ZERO,
            token_a: Address::ZERO,
            token_b: Address::ZERO,
        }
    }
}

/// Token information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    /// Token contract address
    pub address: Address,
    /// Token symbol
    pub symbol: String,
    /// Token decimals
    pub decimals: u8,
}

impl TokenDescriptor {
    pub fn new(address: Address, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            decimals,
        }
    }
}

/// Transaction-flow tuning
///
/// Intervals live in configuration rather than code so a deployment can
/// match its provider's indexing lag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Receipt poll interval in milliseconds
    pub poll_interval_ms: u64,
    /// Maximum total time to poll one receipt before surfacing "still pending"
    pub poll_horizon_ms: u64,
    /// Delay before re-reading an allowance after approval confirmation
    pub settle_delay_ms: u64,
    /// How many delayed re-reads to attempt while the allowance is unchanged
    pub settle_retries: u32,
    /// Timeout for the connectivity probe at context init
    pub network_timeout_ms: u64,
    /// Native balance floor (wei) that must remain available for gas
    pub gas_reserve: U256,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 4_000,
            poll_horizon_ms: 180_000,
            settle_delay_ms: 2_000,
            settle_retries: 3,
            network_timeout_ms: 10_000,
            // 0.001 native coin at 18 decimals
            gas_reserve: U256::from(1_000_000_000_000_000u64),
        }
    }
}

impl FlowConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn poll_horizon(&self) -> Duration {
        Duration::from_millis(self.poll_horizon_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn network_timeout(&self) -> Duration {
        Duration::from_millis(self.network_timeout_ms)
    }
}

/// Network configuration for the MiniDex deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiniDexNetworkConfig {
    /// Network name (e.g., sepolia)
    pub network_name: String,
    /// EVM chain id (e.g., 11155111)
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc_url: String,
    /// Native coin symbol
    pub native_symbol: String,
    /// Native coin decimals
    pub native_decimals: u8,
    /// Contract addresses
    pub contracts: ContractAddresses,
}

impl MiniDexNetworkConfig {
    /// Create a new network config with specified values
    pub fn new(
        network_name: String,
        chain_id: u64,
        rpc_url: String,
        native_symbol: String,
        native_decimals: u8,
        contracts: ContractAddresses,
    ) -> Self {
        Self {
            network_name,
            chain_id,
            rpc_url,
            native_symbol,
            native_decimals,
            contracts,
        }
    }

    /// Create a new network config from network constants
    pub fn from_constants(constants: &NetworkConstants) -> Self {
        Self {
            network_name: constants.network_name.clone(),
            chain_id: constants.chain_id,
            rpc_url: constants.default_rpc.clone(),
            native_symbol: constants.native_symbol.clone(),
            native_decimals: constants.native_decimals,
            contracts: ContractAddresses::default(),
        }
    }

    /// Update contract addresses
    pub fn with_contracts(mut self, contract_addresses: ContractAddresses) -> Self {
        self.contracts = contract_addresses;
        self
    }

    /// Set the liquidity pool contract address
    pub fn with_liquidity_pool(mut self, liquidity_pool: Address) -> Self {
        self.contracts.liquidity_pool = liquidity_pool;
        self
    }

    /// Set the pool token contract addresses
    pub fn with_pool_tokens(mut self, token_a: Address, token_b: Address) -> Self {
        self.contracts.token_a = token_a;
        self.contracts.token_b = token_b;
        self
    }
}

/// Complete configuration with wallet info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active network configuration
    pub network: MiniDexNetworkConfig,
    /// Wallet mnemonic (seed phrase)
    pub mnemonic: Option<String>,
    /// Known tokens and their metadata, keyed by symbol
    pub tokens: HashMap<String, TokenDescriptor>,
    /// Transaction-flow tuning
    #[serde(default)]
    pub flow: FlowConfig,
}

impl Config {
    /// Create a new configuration with the specified network
    pub fn with_network(network: MiniDexNetworkConfig) -> Self {
        Self {
            network,
            mnemonic: None,
            tokens: HashMap::new(),
            flow: FlowConfig::default(),
        }
    }

    /// Create a new configuration with a wallet
    pub fn with_wallet(network: MiniDexNetworkConfig, mnemonic: String) -> Self {
        Self {
            network,
            mnemonic: Some(mnemonic),
            tokens: HashMap::new(),
            flow: FlowConfig::default(),
        }
    }

    /// Load configuration from a file
    pub fn load(path: &PathBuf) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &PathBuf) -> Result<(), Error> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        // Create directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("minidex");
        path.push("config.toml");
        path
    }

    /// Add token information
    pub fn add_token(&mut self, symbol: String, token: TokenDescriptor) {
        self.tokens.insert(symbol, token);
    }

    /// Look up a token descriptor by symbol
    pub fn token(&self, symbol: &str) -> Result<TokenDescriptor, Error> {
        self.tokens
            .get(symbol)
            .cloned()
            .ok_or_else(|| Error::Config(format!("Unknown token: {}", symbol)))
    }
}
