//! Ethereum RPC access over websocket

use async_trait::async_trait;
use ethers::providers::{Middleware, Provider, Ws};
use ethers::types::U256;
use std::sync::Arc;
use tracing::info;

use crate::domain::gas::GasOracle;
use crate::shared::errors::{AppError, ScanError};

pub type WsProvider = Provider<Ws>;

/// Open the websocket provider shared by the venues and the gas oracle.
pub async fn connect_ws(url: &str, reconnects: usize) -> Result<Arc<WsProvider>, AppError> {
    let provider = Provider::<Ws>::connect_with_reconnects(url, reconnects)
        .await
        .map_err(|e| AppError::BlockchainError(format!("Failed to connect to {}: {}", url, e)))?;

    let block = provider
        .get_block_number()
        .await
        .map_err(|e| AppError::BlockchainError(format!("Failed to read block number: {}", e)))?;
    info!("✅ Connected to RPC, current block: {}", block);

    Ok(Arc::new(provider))
}

/// Live gas price from `eth_gasPrice`.
pub struct RpcGasOracle<M: Middleware> {
    client: Arc<M>,
}

impl<M: Middleware> RpcGasOracle<M> {
    pub fn new(client: Arc<M>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<M: Middleware + 'static> GasOracle for RpcGasOracle<M> {
    async fn gas_price(&self) -> Result<U256, ScanError> {
        self.client
            .get_gas_price()
            .await
            .map_err(|e| ScanError::GasQueryFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::providers::MockProvider;

    #[tokio::test]
    async fn test_gas_price_from_rpc() {
        let (provider, mock) = Provider::mocked();
        mock.push::<U256, _>(U256::from(35_000_000_000u64)).unwrap();
        let oracle = RpcGasOracle::new(Arc::new(provider));

        assert_eq!(oracle.gas_price().await.unwrap(), U256::from(35_000_000_000u64));
    }

    #[tokio::test]
    async fn test_gas_price_error_is_gas_query_failed() {
        let (provider, _mock): (Provider<MockProvider>, MockProvider) = Provider::mocked();
        let oracle = RpcGasOracle::new(Arc::new(provider));

        assert!(matches!(oracle.gas_price().await, Err(ScanError::GasQueryFailed(_))));
    }
}
