use anyhow::Result;
use clap::Parser;
use ethers::types::Address;
use tracing_subscriber::EnvFilter;

use blockarb::{app, config};

#[derive(Parser, Debug)]
#[command(version, about = "Block-triggered Kyber/Uniswap arbitrage scanner")]
struct Args {
    /// Websocket RPC endpoint
    #[arg(long)]
    ws_url: Option<String>,

    /// Trade size in base token (ETH)
    #[arg(long)]
    amount_base: Option<f64>,

    /// Quote-per-base price used to size the quote-side notional
    #[arg(long)]
    reference_price: Option<f64>,

    /// Assumed gas units per arbitrage
    #[arg(long)]
    gas_units: Option<u64>,

    /// Re-read pool reserves every N blocks (0 = startup snapshot only)
    #[arg(long)]
    pool_refresh_blocks: Option<u64>,

    /// Per-cycle timeout in milliseconds
    #[arg(long)]
    cycle_timeout_ms: Option<u64>,

    /// Suppress reports from cycles that finish after a newer block's cycle
    #[arg(long)]
    supersede_stale_cycles: bool,

    /// Kyber network proxy address (overrides config)
    #[arg(long)]
    kyber_proxy: Option<String>,

    /// Uniswap V2 pair address (overrides config)
    #[arg(long)]
    uniswap_pair: Option<String>,

    /// Path to config file (optional)
    #[arg(long)]
    config: Option<String>,
}

fn parse_address(flag: &str, value: &str) -> Result<Address> {
    value
        .parse::<Address>()
        .map_err(|e| anyhow::anyhow!("{} is not a valid address ({}): {}", flag, value, e))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    // Create AppCfg with priority: CLI args > Config file > Defaults
    let mut app_cfg = if let Some(config_path) = &args.config {
        app::AppCfg::from_config(config::Config::from_file(config_path)?)?
    } else {
        let ws_url = args
            .ws_url
            .clone()
            .ok_or_else(|| anyhow::anyhow!("--ws-url is required when not using --config"))?;
        app::AppCfg::from_cli_args(ws_url)?
    };

    if let Some(kyber_proxy) = &args.kyber_proxy {
        app_cfg.kyber_proxy = parse_address("--kyber-proxy", kyber_proxy)?;
    }
    if let Some(uniswap_pair) = &args.uniswap_pair {
        app_cfg.uniswap_pair = parse_address("--uniswap-pair", uniswap_pair)?;
    }
    if let Some(ws_url) = args.ws_url {
        app_cfg.ws_url = ws_url;
    }
    if let Some(amount_base) = args.amount_base {
        app_cfg.amount_base = amount_base;
    }
    if let Some(reference_price) = args.reference_price {
        app_cfg.reference_price = reference_price;
    }
    if let Some(gas_units) = args.gas_units {
        app_cfg.assumed_gas_units = gas_units;
    }
    if let Some(pool_refresh_blocks) = args.pool_refresh_blocks {
        app_cfg.pool_refresh_blocks = pool_refresh_blocks;
    }
    if let Some(cycle_timeout_ms) = args.cycle_timeout_ms {
        app_cfg.cycle_timeout = std::time::Duration::from_millis(cycle_timeout_ms);
    }
    if args.supersede_stale_cycles {
        app_cfg.supersede_stale_cycles = true;
    }

    app::run(app_cfg).await
}
