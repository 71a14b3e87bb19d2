use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

pub const DEFAULT_WS_URL: &str = "ws://127.0.0.1:8546";
pub const DAI_ADDRESS: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";
pub const WETH_ADDRESS: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
pub const KYBER_PROXY_ADDRESS: &str = "0x818E6FECD516Ecc3849DAf6845e3EC868087B755";
pub const UNISWAP_DAI_WETH_PAIR: &str = "0xA478c2975Ab1Ea89e8196811F51A7B7Ade33eB11";

#[derive(Debug, Clone, Deserialize)]
pub struct RpcCfg {
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Transport-level reconnects of the shared provider.
    #[serde(default = "default_rpc_reconnects")]
    pub reconnects: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenCfg {
    #[serde(default = "default_base_token")]
    pub base_token: TokenInfo,
    #[serde(default = "default_quote_token")]
    pub quote_token: TokenInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VenuesCfg {
    #[serde(default = "default_kyber_proxy")]
    pub kyber_proxy: String,
    #[serde(default = "default_uniswap_pair")]
    pub uniswap_pair: String,
    /// Asset id the aggregator uses for the base token; the native sentinel when unset.
    pub aggregator_base_asset: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradeCfg {
    #[serde(default = "default_amount_base")]
    pub amount_base: f64,
    /// Quote per base used once at startup to size the quote-side notional.
    #[serde(default = "default_reference_price")]
    pub reference_price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GasCfg {
    #[serde(default = "default_assumed_units")]
    pub assumed_units: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanCfg {
    #[serde(default = "default_cycle_timeout_ms")]
    pub cycle_timeout_ms: u64,
    /// Re-read pool reserves every N blocks; 0 keeps the startup snapshot.
    #[serde(default)]
    pub pool_refresh_blocks: u64,
    #[serde(default)]
    pub supersede_stale_cycles: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamCfg {
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rpc: RpcCfg,
    #[serde(default)]
    pub tokens: TokenCfg,
    #[serde(default)]
    pub venues: VenuesCfg,
    #[serde(default)]
    pub trade: TradeCfg,
    #[serde(default)]
    pub gas: GasCfg,
    #[serde(default)]
    pub scan: ScanCfg,
    #[serde(default)]
    pub stream: StreamCfg,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())
            .with_context(|| format!("read {}", path.as_ref().display()))?;
        Self::from_toml(&s)
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s).context("parse Config.toml")?;
        Ok(cfg)
    }
}

fn default_ws_url() -> String {
    DEFAULT_WS_URL.to_string()
}

fn default_rpc_reconnects() -> usize {
    5
}

fn default_base_token() -> TokenInfo {
    TokenInfo {
        address: WETH_ADDRESS.to_string(),
        symbol: "ETH".to_string(),
        decimals: 18,
    }
}

fn default_quote_token() -> TokenInfo {
    TokenInfo {
        address: DAI_ADDRESS.to_string(),
        symbol: "DAI".to_string(),
        decimals: 18,
    }
}

fn default_kyber_proxy() -> String {
    KYBER_PROXY_ADDRESS.to_string()
}

fn default_uniswap_pair() -> String {
    UNISWAP_DAI_WETH_PAIR.to_string()
}

fn default_amount_base() -> f64 {
    100.0
}

fn default_reference_price() -> f64 {
    230.0
}

fn default_assumed_units() -> u64 {
    crate::domain::gas::DEFAULT_ASSUMED_GAS_UNITS
}

fn default_cycle_timeout_ms() -> u64 {
    10_000
}

fn default_max_reconnect_attempts() -> u32 {
    10
}

fn default_reconnect_delay_ms() -> u64 {
    2_000
}

impl Default for RpcCfg {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            reconnects: default_rpc_reconnects(),
        }
    }
}

impl Default for TokenCfg {
    fn default() -> Self {
        Self {
            base_token: default_base_token(),
            quote_token: default_quote_token(),
        }
    }
}

impl Default for VenuesCfg {
    fn default() -> Self {
        Self {
            kyber_proxy: default_kyber_proxy(),
            uniswap_pair: default_uniswap_pair(),
            aggregator_base_asset: None,
        }
    }
}

impl Default for TradeCfg {
    fn default() -> Self {
        Self {
            amount_base: default_amount_base(),
            reference_price: default_reference_price(),
        }
    }
}

impl Default for GasCfg {
    fn default() -> Self {
        Self {
            assumed_units: default_assumed_units(),
        }
    }
}

impl Default for ScanCfg {
    fn default() -> Self {
        Self {
            cycle_timeout_ms: default_cycle_timeout_ms(),
            pool_refresh_blocks: 0,
            supersede_stale_cycles: false,
        }
    }
}

impl Default for StreamCfg {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: default_max_reconnect_attempts(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}
