// src/app.rs
use anyhow::{anyhow, Result};
use ethers::types::Address;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::application::{SubscriberConfig, TriggerSubscriber};
use crate::config::{Config, TokenInfo};
use crate::domain::arbitrage::{CoordinatorConfig, ScanCoordinator};
use crate::domain::dex::RateSource;
use crate::domain::gas::GasEstimator;
use crate::domain::price::RateNormalizer;
use crate::infrastructure::blockchain::{
    connect_ws, KyberProxyAdapter, NewHeadsSource, RpcGasOracle, UniswapV2Adapter, NATIVE_ASSET_SENTINEL,
};
use crate::report::OpportunityReporter;
use crate::shared::types::{AmountBasis, Token};
use crate::shared::utils::format_address;

const VENUE_A_NAME: &str = "Kyber";
const VENUE_B_NAME: &str = "Uniswap";

/// Resolved runtime configuration. Built once at startup and never mutated
/// by the scan path.
#[derive(Debug, Clone)]
pub struct AppCfg {
    pub ws_url: String,
    pub rpc_reconnects: usize,

    pub base_token: Token,
    pub quote_token: Token,

    pub kyber_proxy: Address,
    pub uniswap_pair: Address,
    pub aggregator_base_asset: Address,

    pub amount_base: f64,
    pub reference_price: f64,
    pub assumed_gas_units: u64,

    pub cycle_timeout: Duration,
    pub pool_refresh_blocks: u64,
    pub supersede_stale_cycles: bool,

    pub max_reconnect_attempts: u32,
    pub reconnect_delay: Duration,
}

fn parse_address(field: &str, value: &str) -> Result<Address> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|e| anyhow!("Invalid {} address {}: {}", field, value, e))
}

fn parse_token(field: &str, info: &TokenInfo) -> Result<Token> {
    Ok(Token {
        address: parse_address(field, &info.address)?,
        symbol: info.symbol.clone(),
        decimals: info.decimals,
    })
}

impl AppCfg {
    pub fn from_config(cfg: Config) -> Result<Self> {
        let aggregator_base_asset = match &cfg.venues.aggregator_base_asset {
            Some(addr) => parse_address("aggregator base asset", addr)?,
            None => NATIVE_ASSET_SENTINEL,
        };

        Ok(Self {
            ws_url: cfg.rpc.ws_url,
            rpc_reconnects: cfg.rpc.reconnects,
            base_token: parse_token("base token", &cfg.tokens.base_token)?,
            quote_token: parse_token("quote token", &cfg.tokens.quote_token)?,
            kyber_proxy: parse_address("Kyber proxy", &cfg.venues.kyber_proxy)?,
            uniswap_pair: parse_address("Uniswap pair", &cfg.venues.uniswap_pair)?,
            aggregator_base_asset,
            amount_base: cfg.trade.amount_base,
            reference_price: cfg.trade.reference_price,
            assumed_gas_units: cfg.gas.assumed_units,
            cycle_timeout: Duration::from_millis(cfg.scan.cycle_timeout_ms),
            pool_refresh_blocks: cfg.scan.pool_refresh_blocks,
            supersede_stale_cycles: cfg.scan.supersede_stale_cycles,
            max_reconnect_attempts: cfg.stream.max_reconnect_attempts,
            reconnect_delay: Duration::from_millis(cfg.stream.reconnect_delay_ms),
        })
    }

    /// Mainnet defaults with the endpoint taken from the command line.
    pub fn from_cli_args(ws_url: String) -> Result<Self> {
        let mut app_cfg = Self::from_config(Config::default())?;
        app_cfg.ws_url = ws_url;
        Ok(app_cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ws_url.trim().is_empty() {
            return Err(anyhow!("RPC websocket URL is empty"));
        }
        if self.base_token.address == self.quote_token.address {
            return Err(anyhow!("base and quote token must differ"));
        }
        if !(self.amount_base > 0.0) || !self.amount_base.is_finite() {
            return Err(anyhow!("trade amount must be positive, got {}", self.amount_base));
        }
        if !(self.reference_price > 0.0) || !self.reference_price.is_finite() {
            return Err(anyhow!("reference price must be positive, got {}", self.reference_price));
        }
        if self.assumed_gas_units == 0 {
            return Err(anyhow!("assumed gas units must be non-zero"));
        }
        if self.cycle_timeout.is_zero() {
            return Err(anyhow!("cycle timeout must be non-zero"));
        }
        self.amount_basis()?;
        Ok(())
    }

    pub fn amount_basis(&self) -> Result<AmountBasis> {
        Ok(AmountBasis::new(
            self.amount_base,
            self.reference_price,
            self.base_token.decimals,
            self.quote_token.decimals,
        )?)
    }
}

pub async fn run(app_cfg: AppCfg) -> Result<()> {
    info!("Starting block-triggered arbitrage scanner");
    info!("Configuration: {:?}", app_cfg);

    if let Err(e) = app_cfg.validate() {
        error!("❌ Invalid configuration: {}", e);
        return Err(e);
    }

    let basis = app_cfg.amount_basis()?;
    info!(
        "Trade size: {} {} / {} {}",
        basis.base_amount, app_cfg.base_token.symbol, basis.quote_amount, app_cfg.quote_token.symbol
    );

    let provider = connect_ws(&app_cfg.ws_url, app_cfg.rpc_reconnects).await?;

    let venue_a: Arc<dyn RateSource> = Arc::new(KyberProxyAdapter::new(
        VENUE_A_NAME,
        Arc::clone(&provider),
        app_cfg.kyber_proxy,
        app_cfg.aggregator_base_asset,
        app_cfg.quote_token.address,
    ));
    info!("✅ {} proxy at {}", VENUE_A_NAME, format_address(&app_cfg.kyber_proxy));

    let venue_b: Arc<dyn RateSource> = Arc::new(
        UniswapV2Adapter::connect(
            VENUE_B_NAME,
            Arc::clone(&provider),
            app_cfg.uniswap_pair,
            app_cfg.base_token.address,
            app_cfg.quote_token.address,
            app_cfg.pool_refresh_blocks,
        )
        .await?,
    );

    let gas = GasEstimator::new(Arc::new(RpcGasOracle::new(Arc::clone(&provider))), app_cfg.assumed_gas_units);
    let normalizer = RateNormalizer::new(app_cfg.base_token.decimals, app_cfg.quote_token.decimals);
    let reporter = OpportunityReporter::new(
        VENUE_A_NAME,
        VENUE_B_NAME,
        app_cfg.base_token.symbol.clone(),
        app_cfg.quote_token.symbol.clone(),
    );

    let coordinator = Arc::new(ScanCoordinator::new(
        venue_a,
        venue_b,
        basis,
        normalizer,
        gas,
        reporter,
        CoordinatorConfig {
            cycle_timeout: app_cfg.cycle_timeout,
            supersede_stale_cycles: app_cfg.supersede_stale_cycles,
        },
    ));

    let subscriber = TriggerSubscriber::new(
        NewHeadsSource::new(app_cfg.ws_url.clone()),
        coordinator,
        SubscriberConfig {
            max_reconnect_attempts: app_cfg.max_reconnect_attempts,
            reconnect_delay: app_cfg.reconnect_delay,
        },
    );
    let stats = subscriber.stats_handle();

    let result = tokio::select! {
        res = subscriber.run() => res.map_err(anyhow::Error::from),
        signal = tokio::signal::ctrl_c() => {
            info!("🛑 Shutdown requested");
            signal.map_err(anyhow::Error::from)
        }
    };

    stats.read().await.print_summary();
    result
}
