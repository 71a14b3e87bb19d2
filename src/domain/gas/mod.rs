//! Gas domain - transaction cost estimation

use async_trait::async_trait;
use ethers::types::U256;
use std::sync::Arc;
use tracing::debug;

use crate::shared::errors::ScanError;
use crate::shared::types::GasCost;

/// Gas used by a two-leg arbitrage, assumed rather than simulated.
pub const DEFAULT_ASSUMED_GAS_UNITS: u64 = 200_000;

/// Source of the live network gas price, in wei.
#[async_trait]
pub trait GasOracle: Send + Sync {
    async fn gas_price(&self) -> Result<U256, ScanError>;
}

/// Multiplies the live gas price by a fixed unit count.
#[derive(Clone)]
pub struct GasEstimator {
    oracle: Arc<dyn GasOracle>,
    assumed_units: u64,
}

impl GasEstimator {
    pub fn new(oracle: Arc<dyn GasOracle>, assumed_units: u64) -> Self {
        Self {
            oracle,
            assumed_units,
        }
    }

    /// No fallback value: a failed price query fails the estimate.
    pub async fn estimate(&self) -> Result<GasCost, ScanError> {
        let unit_price = self.oracle.gas_price().await?;
        let cost = GasCost {
            unit_price,
            assumed_units: self.assumed_units,
        };
        debug!("Gas estimate: {} wei x {} units = {:.6} native", unit_price, self.assumed_units, cost.native_cost());
        Ok(cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::testing::{FailingGasOracle, FixedGasOracle};

    #[tokio::test]
    async fn test_estimate_uses_live_price() {
        let estimator = GasEstimator::new(
            Arc::new(FixedGasOracle(U256::from(20_000_000_000u64))),
            DEFAULT_ASSUMED_GAS_UNITS,
        );

        let cost = estimator.estimate().await.unwrap();
        assert_eq!(cost.unit_price, U256::from(20_000_000_000u64));
        assert_eq!(cost.assumed_units, 200_000);
        assert!((cost.native_cost() - 0.004).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_estimate_fails_without_fallback() {
        let estimator = GasEstimator::new(Arc::new(FailingGasOracle), DEFAULT_ASSUMED_GAS_UNITS);

        let err = estimator.estimate().await.unwrap_err();
        assert!(matches!(err, ScanError::GasQueryFailed(_)));
    }
}
