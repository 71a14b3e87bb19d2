//! Ethereum chain access: venue contracts, gas price and block triggers

pub mod block_subscription;
pub mod dex_adapters;
pub mod rpc_client;

pub use block_subscription::NewHeadsSource;
pub use dex_adapters::{KyberProxyAdapter, UniswapV2Adapter, NATIVE_ASSET_SENTINEL};
pub use rpc_client::{connect_ws, RpcGasOracle, WsProvider};
