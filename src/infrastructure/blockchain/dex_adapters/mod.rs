pub mod contracts;
pub mod kyber_adapter;
pub mod uniswap_v2_adapter;

pub use kyber_adapter::{KyberProxyAdapter, NATIVE_ASSET_SENTINEL};
pub use uniswap_v2_adapter::{PoolSnapshot, UniswapV2Adapter};
