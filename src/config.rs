use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable that overrides `funding.sender_private_key`.
pub const SENDER_PRIVATE_KEY_ENV: &str = "SENDER_PRIVATE_KEY";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub chain: ChainConfig,
    pub watch: WatchConfig,
    pub funding: FundingConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChainConfig {
    pub rpc_http: String,
    pub rpc_ws: String,
    #[serde(default = "default_explorer_tx_url")]
    pub explorer_tx_url: String,
}

fn default_explorer_tx_url() -> String {
    "https://ubiqscan.io/tx/".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct WatchConfig {
    pub contract_address: String,
    pub handler_address: String,
    #[serde(default = "default_subscribe_timeout_ms")]
    pub subscribe_timeout_ms: u64,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_subscribe_timeout_ms() -> u64 {
    10_000
}

fn default_reconnect_delay_ms() -> u64 {
    2000
}

fn default_channel_capacity() -> usize {
    64
}

impl WatchConfig {
    pub fn contract(&self) -> eyre::Result<Address> {
        parse_address("watch.contract_address", &self.contract_address)
    }

    pub fn handler(&self) -> eyre::Result<Address> {
        parse_address("watch.handler_address", &self.handler_address)
    }

    pub fn subscribe_timeout(&self) -> Duration {
        Duration::from_millis(self.subscribe_timeout_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FundingConfig {
    pub asset_symbol: String,
    /// Recipients holding more than this (in wei) are not funded.
    pub limit_wei: String,
    pub amount_wei: String,
    #[serde(default = "default_native_decimals")]
    pub native_decimals: u8,
    #[serde(default = "default_summary_decimals")]
    pub summary_decimals: usize,
    pub sender_private_key: Option<String>,
}

fn default_native_decimals() -> u8 {
    18
}

fn default_summary_decimals() -> usize {
    8
}

impl FundingConfig {
    pub fn limit(&self) -> eyre::Result<U256> {
        parse_wei("funding.limit_wei", &self.limit_wei)
    }

    pub fn amount(&self) -> eyre::Result<U256> {
        parse_wei("funding.amount_wei", &self.amount_wei)
    }

    /// Build the sending wallet, preferring the key from the environment.
    pub fn signer(&self) -> eyre::Result<PrivateKeySigner> {
        let key = std::env::var(SENDER_PRIVATE_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.sender_private_key.clone())
            .ok_or_else(|| {
                eyre::eyre!(
                    "No signer key: set {} or funding.sender_private_key",
                    SENDER_PRIVATE_KEY_ENV
                )
            })?;
        parse_signer(&key)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotifierConfig {
    pub webhook_url: Option<String>,
    #[serde(default = "default_username")]
    pub username: String,
    pub avatar_url: Option<String>,
    #[serde(default = "default_notifier_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            username: default_username(),
            avatar_url: None,
            timeout_ms: default_notifier_timeout_ms(),
        }
    }
}

fn default_username() -> String {
    "Bridge Funder".to_string()
}

fn default_notifier_timeout_ms() -> u64 {
    10_000
}

pub fn parse_address(field: &str, value: &str) -> eyre::Result<Address> {
    Address::from_str(value.trim())
        .map_err(|e| eyre::eyre!("Invalid address '{}' for {}: {}", value, field, e))
}

pub fn parse_wei(field: &str, value: &str) -> eyre::Result<U256> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(eyre::eyre!(
            "Invalid wei amount '{}' for {}: expected a decimal integer",
            value,
            field
        ));
    }
    U256::from_str_radix(value, 10)
        .map_err(|e| eyre::eyre!("Invalid wei amount '{}' for {}: {}", value, field, e))
}

pub fn parse_signer(key: &str) -> eyre::Result<PrivateKeySigner> {
    let key = key.trim();
    let key = key.strip_prefix("0x").unwrap_or(key);
    PrivateKeySigner::from_str(key).map_err(|e| eyre::eyre!("Invalid signer key: {}", e))
}

impl Config {
    pub fn load(path: &str) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("Failed to read config file '{}': {}", path, e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| eyre::eyre!("Failed to parse config file '{}': {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> eyre::Result<()> {
        if self.chain.rpc_http.trim().is_empty() {
            return Err(eyre::eyre!("chain.rpc_http must be set"));
        }
        if self.chain.rpc_ws.trim().is_empty() {
            return Err(eyre::eyre!("chain.rpc_ws must be set"));
        }
        self.watch.contract()?;
        self.watch.handler()?;
        if self.watch.channel_capacity == 0 {
            return Err(eyre::eyre!("watch.channel_capacity must be at least 1"));
        }
        self.funding.limit()?;
        if self.funding.amount()?.is_zero() {
            return Err(eyre::eyre!("funding.amount_wei must be greater than zero"));
        }
        Ok(())
    }
}
